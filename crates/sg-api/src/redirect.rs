//! Plain HTTP to HTTPS redirect, enabled by `ENABLE_HTTP_REDIRECT`

use axum::{
    http::{header, HeaderMap, Uri},
    response::Redirect,
    Router,
};

use crate::error::ApiError;

/// Router that answers every request with a permanent redirect to the same
/// host and path over HTTPS
pub fn create_redirect_router() -> Router {
    Router::new().fallback(redirect_to_https)
}

async fn redirect_to_https(headers: HeaderMap, uri: Uri) -> Result<Redirect, ApiError> {
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| uri.authority().map(|a| a.as_str()))
        .filter(|h| !h.is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing host"))?;

    let path = uri.path_and_query().map(|p| p.as_str()).unwrap_or("/");
    Ok(Redirect::permanent(&format!("https://{host}{path}")))
}
