//! Route matching trace, enabled by `DEBUG_INCOMING_API_REQUEST`

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};
use tracing::info;

#[derive(Debug, Clone, Copy)]
pub struct PathTrace {
    /// Unmatched paths are answered by the frontend rather than a 404
    pub frontend_enabled: bool,
}

pub async fn debug_path_middleware(
    State(trace): State<PathTrace>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path();
    match request.extensions().get::<MatchedPath>() {
        Some(matched) => info!(path = %path, route = %matched.as_str(), "Incoming API request"),
        None if trace.frontend_enabled => info!(path = %path, "Frontend fallback"),
        None => info!(path = %path, "Unmatched path"),
    }

    next.run(request).await
}
