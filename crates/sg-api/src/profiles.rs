//! Self-service profile endpoints
//!
//! The caller's stream key comes from the configured identity header.

use axum::{extract::State, http::HeaderMap, Json};
use serde::Serialize;

use crate::auth::authenticated_stream_key;
use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// GET /api/profiles/get
///
/// Returns the caller's token, creating their profile on first use.
pub async fn get_token(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<TokenResponse>, ApiError> {
    let stream_key = caller(&state, &headers)?;
    let token = state.profiles.get_or_create_token(&stream_key).await?;
    Ok(Json(TokenResponse { token }))
}

/// POST /api/profiles/reset
pub async fn reset_token(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<&'static str, ApiError> {
    let stream_key = caller(&state, &headers)?;
    state.profiles.reset_token(&stream_key).await?;
    Ok("OK")
}

fn caller(state: &AppState, headers: &HeaderMap) -> Result<String, ApiError> {
    authenticated_stream_key(state.config.authenticated_user_header.as_deref(), headers)
}
