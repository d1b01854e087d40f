//! Profile Store
//!
//! Durable mapping of stream key to bearer token. The directory-backed
//! store keeps one empty entry per profile whose name encodes both fields
//! (`<stream_key>_<token>`); there is no index file to keep in sync.
//!
//! Stores do not lock. Callers serialize mutations (see
//! [`crate::service::AuthorizationService`]).

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, error};

use crate::error::{ProfileError, Result};
use crate::profile::Profile;

#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Persist a new profile. Fails with `AlreadyExists` if the stream key is taken.
    async fn create(&self, profile: &Profile) -> Result<()>;

    /// Case-insensitive lookup on the stream key
    async fn find_by_stream_key(&self, stream_key: &str) -> Result<Option<Profile>>;

    /// Case-insensitive lookup on the token
    async fn find_by_bearer_token(&self, token: &str) -> Result<Option<Profile>>;

    /// Atomically swap `old` for `new`. Both must carry the same stream key.
    async fn replace(&self, old: &Profile, new: &Profile) -> Result<()>;

    async fn remove(&self, profile: &Profile) -> Result<()>;

    async fn list_all(&self) -> Result<Vec<Profile>>;

    async fn has_stream_key(&self, stream_key: &str) -> Result<bool> {
        Ok(self.find_by_stream_key(stream_key).await?.is_some())
    }

    async fn has_bearer_token(&self, token: &str) -> Result<bool> {
        Ok(self.find_by_bearer_token(token).await?.is_some())
    }

    fn name(&self) -> &str;
}

pub(crate) fn check_same_key(old: &Profile, new: &Profile) -> Result<()> {
    if !old.matches_stream_key(&new.stream_key) {
        return Err(ProfileError::internal(format!(
            "cannot replace profile {} with profile {}",
            old.stream_key, new.stream_key
        )));
    }
    Ok(())
}

// ============================================================================
// Directory-backed store
// ============================================================================

pub struct FileProfileStore {
    root: PathBuf,
}

impl FileProfileStore {
    /// Open the store, creating the base directory if needed
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let store = Self { root: root.into() };
        store.ensure_root().await?;
        Ok(store)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, profile: &Profile) -> PathBuf {
        self.root.join(profile.entry_name())
    }

    async fn ensure_root(&self) -> Result<()> {
        fs::create_dir_all(&self.root).await.map_err(|e| {
            error!(path = %self.root.display(), error = %e, "Error creating profile directory");
            ProfileError::from(e)
        })
    }

    /// Parse every well-formed entry in the base directory
    async fn entries(&self) -> Result<Vec<Profile>> {
        self.ensure_root().await?;

        let mut dir = fs::read_dir(&self.root).await.map_err(|e| {
            error!(path = %self.root.display(), error = %e, "Error reading profile directory");
            ProfileError::from(e)
        })?;

        let mut profiles = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            if entry.file_type().await?.is_dir() {
                continue;
            }
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                debug!(entry = ?file_name, "Skipping non UTF-8 profile entry");
                continue;
            };
            match Profile::from_entry_name(name) {
                Some(profile) => profiles.push(profile),
                None => debug!(entry = %name, "Skipping malformed profile entry"),
            }
        }
        Ok(profiles)
    }
}

#[async_trait]
impl ProfileStore for FileProfileStore {
    async fn create(&self, profile: &Profile) -> Result<()> {
        if self.has_stream_key(&profile.stream_key).await? {
            return Err(ProfileError::already_exists(&profile.stream_key));
        }

        let path = self.entry_path(profile);
        fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => ProfileError::already_exists(&profile.stream_key),
                _ => {
                    error!(path = %path.display(), error = %e, "Error creating profile entry");
                    ProfileError::from(e)
                }
            })?;

        debug!(stream_key = %profile.stream_key, "Profile entry created");
        Ok(())
    }

    async fn find_by_stream_key(&self, stream_key: &str) -> Result<Option<Profile>> {
        Ok(self
            .entries()
            .await?
            .into_iter()
            .find(|p| p.matches_stream_key(stream_key)))
    }

    async fn find_by_bearer_token(&self, token: &str) -> Result<Option<Profile>> {
        Ok(self
            .entries()
            .await?
            .into_iter()
            .find(|p| p.matches_token(token)))
    }

    async fn replace(&self, old: &Profile, new: &Profile) -> Result<()> {
        check_same_key(old, new)?;

        // A single rename within one directory: a crash leaves either the
        // old entry or the new one, never both.
        let from = self.entry_path(old);
        let to = self.entry_path(new);
        fs::rename(&from, &to).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => ProfileError::not_found(&old.stream_key),
            _ => {
                error!(from = %from.display(), to = %to.display(), error = %e, "Error renaming profile entry");
                ProfileError::from(e)
            }
        })
    }

    async fn remove(&self, profile: &Profile) -> Result<()> {
        let path = self.entry_path(profile);
        fs::remove_file(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => ProfileError::not_found(&profile.stream_key),
            _ => {
                error!(path = %path.display(), error = %e, "Error removing profile entry");
                ProfileError::from(e)
            }
        })
    }

    async fn list_all(&self) -> Result<Vec<Profile>> {
        self.entries().await
    }

    fn name(&self) -> &str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn open_temp() -> (tempfile::TempDir, FileProfileStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileProfileStore::open(dir.path().join("profiles")).await.unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_open_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("nested").join("profiles");
        FileProfileStore::open(&root).await.unwrap();
        FileProfileStore::open(&root).await.unwrap();
        assert!(root.is_dir());
    }

    #[tokio::test]
    async fn test_create_writes_single_named_entry() {
        let (_dir, store) = open_temp().await;
        let profile = Profile::new("alice", "token-1");

        store.create(&profile).await.unwrap();

        let names: Vec<String> = std::fs::read_dir(store.root())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["alice_token-1".to_string()]);
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_key_any_case() {
        let (_dir, store) = open_temp().await;
        store.create(&Profile::new("alice", "token-1")).await.unwrap();

        let err = store.create(&Profile::new("ALICE", "token-2")).await.unwrap_err();
        assert!(err.is_already_exists());
    }

    #[tokio::test]
    async fn test_find_by_key_and_token() {
        let (_dir, store) = open_temp().await;
        let profile = Profile::new("Alice", "abc-123");
        store.create(&profile).await.unwrap();

        assert_eq!(store.find_by_stream_key("alice").await.unwrap(), Some(profile.clone()));
        assert_eq!(store.find_by_bearer_token("ABC-123").await.unwrap(), Some(profile));
        assert_eq!(store.find_by_stream_key("bob").await.unwrap(), None);
        assert!(!store.has_bearer_token("abc").await.unwrap());
    }

    #[tokio::test]
    async fn test_replace_renames_entry() {
        let (_dir, store) = open_temp().await;
        let old = Profile::new("alice", "old-token");
        let new = Profile::new("alice", "new-token");
        store.create(&old).await.unwrap();

        store.replace(&old, &new).await.unwrap();

        assert_eq!(store.list_all().await.unwrap(), vec![new]);
        assert!(!store.has_bearer_token("old-token").await.unwrap());
    }

    #[tokio::test]
    async fn test_replace_requires_same_key() {
        let (_dir, store) = open_temp().await;
        let old = Profile::new("alice", "old-token");
        store.create(&old).await.unwrap();

        let result = store.replace(&old, &Profile::new("bob", "new-token")).await;
        assert!(matches!(result, Err(ProfileError::Internal { .. })));
    }

    #[tokio::test]
    async fn test_remove_missing_is_not_found() {
        let (_dir, store) = open_temp().await;
        let profile = Profile::new("alice", "token");
        store.create(&profile).await.unwrap();

        store.remove(&profile).await.unwrap();
        assert!(store.remove(&profile).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_list_skips_malformed_entries_and_directories() {
        let (_dir, store) = open_temp().await;
        store.create(&Profile::new("alice", "token-a")).await.unwrap();
        std::fs::write(store.root().join("README"), b"").unwrap();
        std::fs::write(store.root().join("a_b_c"), b"").unwrap();
        std::fs::create_dir(store.root().join("bob_dir")).unwrap();

        let profiles = store.list_all().await.unwrap();
        assert_eq!(profiles, vec![Profile::new("alice", "token-a")]);
    }

    #[tokio::test]
    async fn test_recreates_missing_directory() {
        let (_dir, store) = open_temp().await;
        std::fs::remove_dir_all(store.root()).unwrap();

        store.create(&Profile::new("alice", "token")).await.unwrap();
        assert_eq!(store.list_all().await.unwrap().len(), 1);
    }
}
