//! Profile Service Tests
//!
//! Tests for:
//! - Create / lookup / reset / remove against the directory store
//! - Concurrent creation (distinct and identical keys)
//! - Session revocation on credential changes
//! - Persistence across store reopen
//! - Storage failures

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;

use sg_profiles::{
    AuthorizationService, FileProfileStore, InMemorySessionRegistry, Profile, ProfileError,
    ProfileStore, RevocationBridge, SessionRegistry,
};

async fn file_service(dir: &std::path::Path) -> AuthorizationService {
    let store = FileProfileStore::open(dir.join("profiles")).await.unwrap();
    AuthorizationService::new(Arc::new(store))
}

async fn file_service_with_sessions(
    dir: &std::path::Path,
) -> (AuthorizationService, Arc<InMemorySessionRegistry>) {
    let registry = Arc::new(InMemorySessionRegistry::new());
    let service = file_service(dir)
        .await
        .with_revocation(RevocationBridge::new(registry.clone()));
    (service, registry)
}

// ============================================================================
// Basic Lifecycle
// ============================================================================

#[tokio::test]
async fn test_create_then_get_existing_token() {
    let dir = tempfile::tempdir().unwrap();
    let service = file_service(dir.path()).await;

    let token = service.create_profile("alice").await.unwrap();

    assert_eq!(service.get_existing_token("alice").await.unwrap(), token);
    assert_eq!(service.lookup_token_by_stream_key("Alice").await.unwrap(), token);
}

#[tokio::test]
async fn test_alice_reset_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let service = file_service(dir.path()).await;

    let t1 = service.create_profile("alice").await.unwrap();
    let t2 = service.reset_token("alice").await.unwrap();

    assert_ne!(t1, t2);
    assert_eq!(service.get_existing_token("alice").await.unwrap(), t2);
    assert!(service.lookup_stream_key_by_token(&t1).await.unwrap_err().is_not_found());
    assert_eq!(service.lookup_stream_key_by_token(&t2).await.unwrap(), "alice");
}

#[tokio::test]
async fn test_repeated_resets_never_reuse_token() {
    let dir = tempfile::tempdir().unwrap();
    let service = file_service(dir.path()).await;

    let mut seen = HashSet::new();
    seen.insert(service.create_profile("alice").await.unwrap());
    for _ in 0..10 {
        let token = service.reset_token("alice").await.unwrap();
        assert!(seen.insert(token), "reset returned a previously issued token");
    }
    assert_eq!(service.list_all_profiles().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_remove_twice() {
    let dir = tempfile::tempdir().unwrap();
    let service = file_service(dir.path()).await;
    service.create_profile("alice").await.unwrap();

    service.remove_profile("alice").await.unwrap();
    let err = service.remove_profile("alice").await.unwrap_err();
    assert!(matches!(err, ProfileError::NotFound { .. }));
}

#[tokio::test]
async fn test_list_contains_exactly_created_pairs() {
    let dir = tempfile::tempdir().unwrap();
    let service = file_service(dir.path()).await;

    let token_b = service.create_profile("B").await.unwrap();
    let token_a = service.create_profile("A").await.unwrap();

    let listed: HashSet<Profile> = service.list_all_profiles().await.unwrap().into_iter().collect();
    let expected: HashSet<Profile> =
        [Profile::new("A", token_a), Profile::new("B", token_b)].into_iter().collect();
    assert_eq!(listed, expected);
}

#[tokio::test]
async fn test_profiles_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let token = {
        let service = file_service(dir.path()).await;
        service.create_profile("alice").await.unwrap()
    };

    let service = file_service(dir.path()).await;
    assert_eq!(service.get_existing_token("alice").await.unwrap(), token);
}

#[tokio::test]
async fn test_unusable_directory_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("profiles");
    let store = FileProfileStore::open(&root).await.unwrap();
    std::fs::remove_dir(&root).unwrap();
    std::fs::write(&root, b"not a directory").unwrap();
    let service = AuthorizationService::new(Arc::new(store));

    let err = service.create_profile("alice").await.unwrap_err();
    assert!(matches!(err, ProfileError::Io(_)), "unexpected error: {err}");
    assert!(matches!(service.list_all_profiles().await, Err(ProfileError::Io(_))));
}

#[tokio::test]
async fn test_open_on_plain_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("profiles");
    std::fs::write(&root, b"not a directory").unwrap();

    let result = FileProfileStore::open(&root).await;
    assert!(matches!(result, Err(ProfileError::Io(_))));
}

// ============================================================================
// Concurrency
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_distinct_creates_all_succeed() {
    let dir = tempfile::tempdir().unwrap();
    let service = file_service(dir.path()).await;

    let results = join_all((0..32).map(|i| {
        let service = service.clone();
        async move { service.create_profile(&format!("stream-{i}")).await }
    }))
    .await;

    let tokens: HashSet<String> = results.into_iter().map(|r| r.unwrap()).collect();
    assert_eq!(tokens.len(), 32);
    assert_eq!(service.list_all_profiles().await.unwrap().len(), 32);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_same_key_creates_exactly_one() {
    let dir = tempfile::tempdir().unwrap();
    let service = file_service(dir.path()).await;

    let results = join_all((0..16).map(|_| {
        let service = service.clone();
        tokio::spawn(async move { service.create_profile("alice").await })
    }))
    .await;

    let mut successes = 0;
    for result in results {
        match result.unwrap() {
            Ok(_) => successes += 1,
            Err(e) => assert!(e.is_already_exists(), "unexpected error: {e}"),
        }
    }
    assert_eq!(successes, 1);
    assert_eq!(service.store().list_all().await.unwrap().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_get_or_create_agree() {
    let dir = tempfile::tempdir().unwrap();
    let service = file_service(dir.path()).await;

    let tokens: HashSet<String> = join_all((0..8).map(|_| {
        let service = service.clone();
        async move { service.get_or_create_token("alice").await.unwrap() }
    }))
    .await
    .into_iter()
    .collect();

    assert_eq!(tokens.len(), 1);
}

// ============================================================================
// Revocation
// ============================================================================

#[tokio::test]
async fn test_reset_with_live_session_terminates_once() {
    let dir = tempfile::tempdir().unwrap();
    let (service, registry) = file_service_with_sessions(dir.path()).await;
    service.create_profile("alice").await.unwrap();
    registry.register("alice", "host-42");
    registry.register("bob", "host-7");

    service.reset_token("alice").await.unwrap();

    assert_eq!(registry.terminated(), vec!["host-42".to_string()]);
    assert!(registry.find_session_by_stream_key("bob").is_some());
}

#[tokio::test]
async fn test_reset_without_live_session_terminates_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let (service, registry) = file_service_with_sessions(dir.path()).await;
    service.create_profile("alice").await.unwrap();

    service.reset_token("alice").await.unwrap();

    assert!(registry.terminated().is_empty());
}

#[tokio::test]
async fn test_failed_reset_does_not_revoke() {
    let dir = tempfile::tempdir().unwrap();
    let (service, registry) = file_service_with_sessions(dir.path()).await;
    registry.register("ghost", "host-1");

    assert!(service.reset_token("ghost").await.is_err());
    assert!(registry.terminated().is_empty());
}

#[tokio::test]
async fn test_remove_with_live_session_terminates_once() {
    let dir = tempfile::tempdir().unwrap();
    let (service, registry) = file_service_with_sessions(dir.path()).await;
    service.create_profile("alice").await.unwrap();
    registry.register("alice", "host-42");

    service.remove_profile("alice").await.unwrap();

    assert_eq!(registry.terminated(), vec!["host-42".to_string()]);
    assert!(registry.active_sessions().is_empty());
}
