//! In-memory profile store for tests and ephemeral deployments

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::{ProfileError, Result};
use crate::profile::Profile;
use crate::store::{check_same_key, ProfileStore};

#[derive(Default)]
pub struct InMemoryProfileStore {
    profiles: RwLock<Vec<Profile>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profiles(profiles: impl IntoIterator<Item = Profile>) -> Self {
        Self {
            profiles: RwLock::new(profiles.into_iter().collect()),
        }
    }

    pub fn len(&self) -> usize {
        self.profiles.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.read().is_empty()
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn create(&self, profile: &Profile) -> Result<()> {
        let mut profiles = self.profiles.write();
        if profiles.iter().any(|p| p.matches_stream_key(&profile.stream_key)) {
            return Err(ProfileError::already_exists(&profile.stream_key));
        }
        profiles.push(profile.clone());
        Ok(())
    }

    async fn find_by_stream_key(&self, stream_key: &str) -> Result<Option<Profile>> {
        Ok(self
            .profiles
            .read()
            .iter()
            .find(|p| p.matches_stream_key(stream_key))
            .cloned())
    }

    async fn find_by_bearer_token(&self, token: &str) -> Result<Option<Profile>> {
        Ok(self.profiles.read().iter().find(|p| p.matches_token(token)).cloned())
    }

    async fn replace(&self, old: &Profile, new: &Profile) -> Result<()> {
        check_same_key(old, new)?;
        let mut profiles = self.profiles.write();
        let slot = profiles
            .iter_mut()
            .find(|p| **p == *old)
            .ok_or_else(|| ProfileError::not_found(&old.stream_key))?;
        *slot = new.clone();
        Ok(())
    }

    async fn remove(&self, profile: &Profile) -> Result<()> {
        let mut profiles = self.profiles.write();
        let before = profiles.len();
        profiles.retain(|p| p != profile);
        if profiles.len() == before {
            return Err(ProfileError::not_found(&profile.stream_key));
        }
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Profile>> {
        Ok(self.profiles.read().clone())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
