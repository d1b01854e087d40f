//! Profile record and its on-disk entry name

use serde::{Deserialize, Serialize};

use crate::error::{ProfileError, Result};

/// Separator between the stream key and the token in an entry name
pub const SEPARATOR: char = '_';

/// Longest accepted stream key. Keeps `<key>_<uuid>` well under common
/// filename limits.
pub const MAX_STREAM_KEY_LEN: usize = 128;

/// A stream key bound to its bearer token
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub stream_key: String,
    pub token: String,
}

impl Profile {
    pub fn new(stream_key: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            stream_key: stream_key.into(),
            token: token.into(),
        }
    }

    /// Entry name used by the directory-backed store
    pub fn entry_name(&self) -> String {
        format!("{}{}{}", self.stream_key, SEPARATOR, self.token)
    }

    /// Parse an entry name back into a profile.
    ///
    /// Exactly one separator is expected; names with an empty part or
    /// more than one separator are rejected.
    pub fn from_entry_name(name: &str) -> Option<Self> {
        let (stream_key, token) = name.split_once(SEPARATOR)?;
        if stream_key.is_empty() || token.is_empty() || token.contains(SEPARATOR) {
            return None;
        }
        Some(Self::new(stream_key, token))
    }

    pub fn matches_stream_key(&self, stream_key: &str) -> bool {
        fold_eq(&self.stream_key, stream_key)
    }

    pub fn matches_token(&self, token: &str) -> bool {
        fold_eq(&self.token, token)
    }
}

/// Case-insensitive equality
pub fn fold_eq(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b) || a.to_lowercase() == b.to_lowercase()
}

/// Reject stream keys that cannot be stored unambiguously as an entry name
pub fn validate_stream_key(stream_key: &str) -> Result<()> {
    if stream_key.is_empty() {
        return Err(ProfileError::invalid_key("stream key must not be empty"));
    }
    if stream_key.len() > MAX_STREAM_KEY_LEN {
        return Err(ProfileError::invalid_key(format!(
            "stream key must be at most {} bytes",
            MAX_STREAM_KEY_LEN
        )));
    }
    if stream_key.contains(SEPARATOR) {
        return Err(ProfileError::invalid_key(format!(
            "stream key must not contain '{}'",
            SEPARATOR
        )));
    }
    if stream_key.contains(['/', '\\', '\0']) || stream_key == "." || stream_key == ".." {
        return Err(ProfileError::invalid_key("stream key must not be a path"));
    }
    Ok(())
}
