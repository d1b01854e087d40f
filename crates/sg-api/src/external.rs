//! Endpoints owned by the media session engine
//!
//! WHIP/WHEP signalling, SSE, layer selection, logging and the remaining
//! admin endpoints live outside this crate. The router forwards them
//! untouched to whatever [`ExternalEndpoints`] implementation is attached.

use async_trait::async_trait;
use axum::{
    extract::{Request, State},
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::error::ApiError;
use crate::AppState;

/// Route patterns forwarded to the session engine
pub const DELEGATED_ROUTES: &[&str] = &[
    "/api/whip",
    "/api/whip/*rest",
    "/api/whep",
    "/api/whep/*rest",
    "/api/sse/*rest",
    "/api/layer/*rest",
    "/api/log",
    "/api/admin/login",
    "/api/admin/status",
    "/api/admin/logging",
];

#[async_trait]
pub trait ExternalEndpoints: Send + Sync {
    async fn handle(&self, request: Request) -> Response;
}

pub async fn delegate(State(state): State<AppState>, request: Request) -> Response {
    match &state.external {
        Some(external) => external.handle(request).await,
        None => {
            debug!(path = %request.uri().path(), "No session engine attached");
            ApiError::NotImplemented.into_response()
        }
    }
}
