//! Admin profile endpoints

use axum::{extract::State, http::HeaderMap, http::StatusCode, Json};
use bytes::Bytes;
use serde::Deserialize;
use sg_profiles::Profile;
use tracing::info;

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamKeyRequest {
    pub stream_key: String,
}

/// GET /api/admin/profiles
pub async fn list_profiles(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Profile>>, ApiError> {
    state.admin.verify(&headers).await.require()?;
    Ok(Json(state.profiles.list_all_profiles().await?))
}

/// POST /api/admin/profiles/reset-token
pub async fn reset_token(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    state.admin.verify(&headers).await.require()?;
    let request = parse_body(&body)?;

    state.profiles.reset_token(&request.stream_key).await?;
    info!(stream_key = %request.stream_key, "Admin reset token");
    Ok(StatusCode::OK)
}

/// POST /api/admin/profiles/add-profile
pub async fn add_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    state.admin.verify(&headers).await.require()?;
    let request = parse_body(&body)?;

    state.profiles.create_profile(&request.stream_key).await?;
    info!(stream_key = %request.stream_key, "Admin added profile");
    Ok(StatusCode::OK)
}

/// POST /api/admin/profiles/remove-profile
pub async fn remove_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    state.admin.verify(&headers).await.require()?;
    let request = parse_body(&body)?;

    state.profiles.remove_profile(&request.stream_key).await?;
    info!(stream_key = %request.stream_key, "Admin removed profile");
    Ok(StatusCode::OK)
}

fn parse_body(body: &[u8]) -> Result<StreamKeyRequest, ApiError> {
    serde_json::from_slice(body).map_err(|_| ApiError::bad_request("Error resolving request"))
}
