//! Bearer token generation
//!
//! Tokens are UUID v4 strings. Uniqueness across live profiles is enforced
//! by checking the store and drawing again on collision, up to
//! [`MAX_TOKEN_ATTEMPTS`] times.

use std::sync::Arc;

use tracing::warn;

use crate::error::{ProfileError, Result};
use crate::store::ProfileStore;

/// Upper bound on draws before giving up
pub const MAX_TOKEN_ATTEMPTS: usize = 8;

/// Source of candidate tokens
pub trait TokenSource: Send + Sync {
    fn next_token(&self) -> String;
}

/// Random UUID v4, hyphenated lowercase
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidTokenSource;

impl TokenSource for UuidTokenSource {
    fn next_token(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

#[derive(Clone)]
pub struct TokenGenerator {
    source: Arc<dyn TokenSource>,
    max_attempts: usize,
}

impl Default for TokenGenerator {
    fn default() -> Self {
        Self::new(Arc::new(UuidTokenSource))
    }
}

impl TokenGenerator {
    pub fn new(source: Arc<dyn TokenSource>) -> Self {
        Self {
            source,
            max_attempts: MAX_TOKEN_ATTEMPTS,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Draw a token not held by any profile in `store`.
    ///
    /// Must run under the store write lock, otherwise a concurrent create
    /// can claim the same token between the check and the write.
    pub async fn generate(&self, store: &dyn ProfileStore) -> Result<String> {
        for attempt in 1..=self.max_attempts {
            let token = self.source.next_token();
            if !store.has_bearer_token(&token).await? {
                return Ok(token);
            }
            warn!(attempt, "Generated token collides with an existing profile, retrying");
        }
        Err(ProfileError::TokenExhausted {
            attempts: self.max_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryProfileStore;
    use crate::profile::Profile;
    use parking_lot::Mutex;

    /// Hands out a fixed sequence of tokens, then repeats the last one
    struct ScriptedSource {
        tokens: Mutex<Vec<String>>,
    }

    impl ScriptedSource {
        fn new(tokens: &[&str]) -> Self {
            let mut tokens: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();
            tokens.reverse();
            Self { tokens: Mutex::new(tokens) }
        }
    }

    impl TokenSource for ScriptedSource {
        fn next_token(&self) -> String {
            let mut tokens = self.tokens.lock();
            if tokens.len() > 1 {
                tokens.pop().unwrap()
            } else {
                tokens[0].clone()
            }
        }
    }

    #[test]
    fn test_uuid_tokens_are_distinct_and_separator_free() {
        let source = UuidTokenSource;
        let a = source.next_token();
        let b = source.next_token();
        assert_ne!(a, b);
        assert_eq!(a.len(), 36);
        assert!(!a.contains(crate::profile::SEPARATOR));
    }

    #[tokio::test]
    async fn test_retries_past_collisions() {
        let store = InMemoryProfileStore::with_profiles([
            Profile::new("alice", "taken-1"),
            Profile::new("bob", "taken-2"),
        ]);
        let generator = TokenGenerator::new(Arc::new(ScriptedSource::new(&[
            "taken-1", "TAKEN-2", "fresh",
        ])));

        assert_eq!(generator.generate(&store).await.unwrap(), "fresh");
    }

    #[tokio::test]
    async fn test_gives_up_after_bound() {
        let store = InMemoryProfileStore::with_profiles([Profile::new("alice", "taken")]);
        let generator = TokenGenerator::new(Arc::new(ScriptedSource::new(&["taken"])))
            .with_max_attempts(3);

        let err = generator.generate(&store).await.unwrap_err();
        assert!(matches!(err, ProfileError::TokenExhausted { attempts: 3 }));
    }
}
