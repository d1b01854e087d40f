//! Authorization Service
//!
//! Profile CRUD on top of a [`ProfileStore`]. All mutations hold a
//! store-wide write lock across check, token generation and write, so two
//! creates for the same key cannot both succeed and the token collision
//! check cannot race another create. Reads hold the read side.
//!
//! Mutations run on their own task: a caller that goes away mid-request
//! does not leave a half-applied change behind.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use crate::error::{ProfileError, Result};
use crate::profile::{validate_stream_key, Profile};
use crate::revocation::RevocationBridge;
use crate::store::ProfileStore;
use crate::token::TokenGenerator;

#[derive(Clone)]
pub struct AuthorizationService {
    store: Arc<dyn ProfileStore>,
    tokens: TokenGenerator,
    revocation: Option<RevocationBridge>,
    lock: Arc<RwLock<()>>,
}

impl AuthorizationService {
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        Self {
            store,
            tokens: TokenGenerator::default(),
            revocation: None,
            lock: Arc::new(RwLock::new(())),
        }
    }

    pub fn with_token_generator(mut self, tokens: TokenGenerator) -> Self {
        self.tokens = tokens;
        self
    }

    /// Terminate live sessions whenever a token is reset or a profile removed
    pub fn with_revocation(mut self, revocation: RevocationBridge) -> Self {
        self.revocation = Some(revocation);
        self
    }

    pub fn store(&self) -> &Arc<dyn ProfileStore> {
        &self.store
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Create a profile for `stream_key` and return its new token
    pub async fn create_profile(&self, stream_key: &str) -> Result<String> {
        validate_stream_key(stream_key)?;
        let this = self.clone();
        let stream_key = stream_key.to_string();
        run_to_completion(async move {
            let _guard = this.lock.write().await;
            this.create_unlocked(&stream_key).await
        })
        .await
    }

    /// Return the token for `stream_key`, creating the profile if it does not exist
    pub async fn get_or_create_token(&self, stream_key: &str) -> Result<String> {
        validate_stream_key(stream_key)?;
        let this = self.clone();
        let stream_key = stream_key.to_string();
        run_to_completion(async move {
            let _guard = this.lock.write().await;
            if let Some(profile) = this.store.find_by_stream_key(&stream_key).await? {
                return Ok(profile.token);
            }
            this.create_unlocked(&stream_key).await
        })
        .await
    }

    /// Replace the token of `stream_key` and terminate its live session.
    ///
    /// The returned token always differs from the previous one.
    pub async fn reset_token(&self, stream_key: &str) -> Result<String> {
        let this = self.clone();
        let stream_key = stream_key.to_string();
        run_to_completion(async move {
            let _guard = this.lock.write().await;
            let old = this.require(&stream_key).await?;

            // The old token is still stored, so the generator cannot hand it back.
            let token = this.tokens.generate(this.store.as_ref()).await?;
            let new = Profile::new(old.stream_key.clone(), token.clone());
            this.store.replace(&old, &new).await?;

            info!(stream_key = %new.stream_key, "Profile token reset");
            this.revoke(&new.stream_key);
            Ok(token)
        })
        .await
    }

    /// Delete the profile of `stream_key` and terminate its live session
    pub async fn remove_profile(&self, stream_key: &str) -> Result<()> {
        let this = self.clone();
        let stream_key = stream_key.to_string();
        run_to_completion(async move {
            let _guard = this.lock.write().await;
            let profile = this.require(&stream_key).await?;
            this.store.remove(&profile).await?;

            info!(stream_key = %profile.stream_key, "Profile removed");
            this.revoke(&profile.stream_key);
            Ok(())
        })
        .await
    }

    // ========================================================================
    // Lookups
    // ========================================================================

    pub async fn get_existing_token(&self, stream_key: &str) -> Result<String> {
        self.lookup_token_by_stream_key(stream_key).await
    }

    pub async fn lookup_token_by_stream_key(&self, stream_key: &str) -> Result<String> {
        let _guard = self.lock.read().await;
        Ok(self.require(stream_key).await?.token)
    }

    /// Resolve the stream key a bearer token was issued for
    pub async fn lookup_stream_key_by_token(&self, token: &str) -> Result<String> {
        let _guard = self.lock.read().await;
        self.store
            .find_by_bearer_token(token)
            .await?
            .map(|p| p.stream_key)
            .ok_or_else(|| ProfileError::not_found("token"))
    }

    /// All profiles, ordered by stream key
    pub async fn list_all_profiles(&self) -> Result<Vec<Profile>> {
        let _guard = self.lock.read().await;
        let mut profiles = self.store.list_all().await?;
        profiles.sort_by_cached_key(|p| p.stream_key.to_lowercase());
        Ok(profiles)
    }

    // ========================================================================
    // Helpers (caller holds the lock)
    // ========================================================================

    async fn create_unlocked(&self, stream_key: &str) -> Result<String> {
        if self.store.has_stream_key(stream_key).await? {
            return Err(ProfileError::already_exists(stream_key));
        }

        let token = self.tokens.generate(self.store.as_ref()).await?;
        self.store.create(&Profile::new(stream_key, token.clone())).await?;

        info!(stream_key = %stream_key, store = self.store.name(), "Profile created");
        Ok(token)
    }

    async fn require(&self, stream_key: &str) -> Result<Profile> {
        self.store
            .find_by_stream_key(stream_key)
            .await?
            .ok_or_else(|| ProfileError::not_found(stream_key))
    }

    fn revoke(&self, stream_key: &str) {
        if let Some(revocation) = &self.revocation {
            revocation.on_token_invalidated(stream_key);
        }
    }
}

/// Run `op` on its own task so dropping the caller does not cancel it
async fn run_to_completion<T, F>(op: F) -> Result<T>
where
    F: Future<Output = Result<T>> + Send + 'static,
    T: Send + 'static,
{
    tokio::spawn(op)
        .await
        .map_err(|e| ProfileError::internal(format!("profile task failed: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryProfileStore;
    use crate::sessions::InMemorySessionRegistry;

    fn service() -> AuthorizationService {
        AuthorizationService::new(Arc::new(InMemoryProfileStore::new()))
    }

    #[tokio::test]
    async fn test_create_then_get_returns_same_token() {
        let service = service();
        let token = service.create_profile("alice").await.unwrap();
        assert_eq!(service.get_existing_token("alice").await.unwrap(), token);
        assert_eq!(service.lookup_stream_key_by_token(&token).await.unwrap(), "alice");
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_keys() {
        let service = service();
        for key in ["", "has_separator", "../escape"] {
            let err = service.create_profile(key).await.unwrap_err();
            assert!(matches!(err, ProfileError::InvalidKey { .. }), "{key:?}");
        }
        assert!(service.list_all_profiles().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_twice_is_already_exists() {
        let service = service();
        service.create_profile("alice").await.unwrap();
        let err = service.create_profile("alice").await.unwrap_err();
        assert!(err.is_already_exists());
    }

    #[tokio::test]
    async fn test_get_or_create_is_stable() {
        let service = service();
        let first = service.get_or_create_token("alice").await.unwrap();
        let second = service.get_or_create_token("ALICE").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_reset_missing_is_not_found() {
        let service = service();
        assert!(service.reset_token("ghost").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_reset_and_remove_revoke_live_session() {
        let registry = Arc::new(InMemorySessionRegistry::new());
        let service = service().with_revocation(RevocationBridge::new(registry.clone()));
        service.create_profile("alice").await.unwrap();

        registry.register("alice", "conn-1");
        service.reset_token("alice").await.unwrap();
        assert_eq!(registry.terminated(), vec!["conn-1".to_string()]);

        registry.register("alice", "conn-2");
        service.remove_profile("alice").await.unwrap();
        assert_eq!(registry.terminated(), vec!["conn-1".to_string(), "conn-2".to_string()]);
    }

    #[tokio::test]
    async fn test_list_is_sorted_by_key() {
        let service = service();
        service.create_profile("charlie").await.unwrap();
        service.create_profile("Alice").await.unwrap();
        service.create_profile("bob").await.unwrap();

        let keys: Vec<String> = service
            .list_all_profiles()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.stream_key)
            .collect();
        assert_eq!(keys, vec!["Alice", "bob", "charlie"]);
    }
}
