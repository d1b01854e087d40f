//! StreamGate Profiles
//!
//! Stream key authorization core:
//! - Profile store (stream key -> bearer token), directory or memory backed
//! - Collision-free token generation
//! - Authorization service with store-wide locking
//! - Revocation of live sessions when a credential changes

pub mod error;
pub mod memory;
pub mod profile;
pub mod revocation;
pub mod service;
pub mod sessions;
pub mod store;
pub mod token;

pub use error::{ProfileError, Result};
pub use memory::InMemoryProfileStore;
pub use profile::{Profile, MAX_STREAM_KEY_LEN, SEPARATOR};
pub use revocation::{RevocationBridge, SessionHandle, SessionRegistry};
pub use service::AuthorizationService;
pub use sessions::InMemorySessionRegistry;
pub use store::{FileProfileStore, ProfileStore};
pub use token::{TokenGenerator, TokenSource, UuidTokenSource, MAX_TOKEN_ATTEMPTS};
