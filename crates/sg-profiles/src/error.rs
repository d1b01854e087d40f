//! Profile Error Types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("Invalid stream key: {message}")]
    InvalidKey { message: String },

    #[error("Profile already exists: {stream_key}")]
    AlreadyExists { stream_key: String },

    #[error("Profile not found: {what}")]
    NotFound { what: String },

    #[error("Storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not generate a unique token after {attempts} attempts")]
    TokenExhausted { attempts: usize },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl ProfileError {
    pub fn invalid_key(message: impl Into<String>) -> Self {
        Self::InvalidKey { message: message.into() }
    }

    pub fn already_exists(stream_key: impl Into<String>) -> Self {
        Self::AlreadyExists { stream_key: stream_key.into() }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }
}

pub type Result<T> = std::result::Result<T, ProfileError>;
