//! Caller identity for the profile endpoints
//!
//! Supports:
//! - Self-service: stream key taken from a header set by an upstream
//!   authenticating proxy
//! - Admin: pluggable [`AdminVerifier`], bearer token by default

use async_trait::async_trait;
use axum::http::{header, HeaderMap};
use subtle::ConstantTimeEq;
use tracing::debug;

use crate::error::ApiError;

/// Outcome of an admin check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSession {
    pub is_valid: bool,
    pub error_message: String,
}

impl AdminSession {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            error_message: String::new(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            error_message: message.into(),
        }
    }

    /// Convert to a 401 rejection when not valid
    pub fn require(self) -> Result<(), ApiError> {
        if self.is_valid {
            Ok(())
        } else {
            Err(ApiError::unauthorized(self.error_message))
        }
    }
}

/// Decides whether a request carries admin rights
#[async_trait]
pub trait AdminVerifier: Send + Sync {
    async fn verify(&self, headers: &HeaderMap) -> AdminSession;
}

/// Accepts `Authorization: Bearer <token>` matching a configured admin token
pub struct BearerAdminVerifier {
    token: Option<String>,
}

impl BearerAdminVerifier {
    pub fn new(token: Option<String>) -> Self {
        Self { token }
    }
}

#[async_trait]
impl AdminVerifier for BearerAdminVerifier {
    async fn verify(&self, headers: &HeaderMap) -> AdminSession {
        let Some(expected) = self.token.as_deref() else {
            return AdminSession::invalid("Admin access not enabled");
        };

        let presented = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));

        match presented {
            Some(token) if bool::from(token.as_bytes().ct_eq(expected.as_bytes())) => {
                debug!("Admin token accepted");
                AdminSession::valid()
            }
            Some(_) => AdminSession::invalid("Invalid admin token"),
            None => AdminSession::invalid("Missing admin token"),
        }
    }
}

/// Stream key asserted by the upstream proxy for a self-service request
pub fn authenticated_stream_key(
    header_name: Option<&str>,
    headers: &HeaderMap,
) -> Result<String, ApiError> {
    let Some(header_name) = header_name else {
        return Err(ApiError::forbidden("Authorization not enabled"));
    };

    let Some(value) = headers.get(header_name) else {
        return Err(ApiError::unauthorized("No authorized user"));
    };

    // UTF-8, not visible ASCII: upstream user names may be non-ASCII.
    let user = std::str::from_utf8(value.as_bytes())
        .map_err(|_| ApiError::bad_request("Invalid authorized user"))?
        .trim();
    if user.is_empty() {
        return Err(ApiError::unauthorized("No authorized user"));
    }
    Ok(user.to_string())
}
