//! HTTP error mapping
//!
//! Every handler returns `Result<_, ApiError>`. Bodies are plain text;
//! server-side failures are logged and answered with a generic message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sg_profiles::ProfileError;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Profile(#[from] ProfileError),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Not Implemented")]
    NotImplemented,
}

impl ApiError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Profile(e) => match e {
                ProfileError::InvalidKey { .. } => StatusCode::BAD_REQUEST,
                ProfileError::AlreadyExists { .. } => StatusCode::CONFLICT,
                ProfileError::NotFound { .. } => StatusCode::NOT_FOUND,
                ProfileError::Io(_)
                | ProfileError::TokenExhausted { .. }
                | ProfileError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotImplemented => StatusCode::NOT_IMPLEMENTED,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() && status != StatusCode::NOT_IMPLEMENTED {
            error!(error = %self, "Request failed");
            return (status, "Internal Server Error").into_response();
        }

        warn!(status = status.as_u16(), error = %self, "Request rejected");
        (status, self.to_string()).into_response()
    }
}
