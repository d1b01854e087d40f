//! Session revocation
//!
//! Live media sessions are owned by the session engine. This module only
//! needs to find the session bound to a stream key and ask the engine to
//! tear it down once the key's token is no longer valid.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

/// A live session as reported by the session engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionHandle {
    pub stream_key: String,
    /// Connection id of the session's current publisher
    pub host_connection_id: String,
}

impl SessionHandle {
    pub fn new(stream_key: impl Into<String>, host_connection_id: impl Into<String>) -> Self {
        Self {
            stream_key: stream_key.into(),
            host_connection_id: host_connection_id.into(),
        }
    }
}

/// Lookup and teardown contract implemented by the session engine
pub trait SessionRegistry: Send + Sync {
    fn find_session_by_stream_key(&self, stream_key: &str) -> Option<SessionHandle>;

    fn terminate_session(&self, host_connection_id: &str);

    fn active_sessions(&self) -> Vec<SessionHandle>;
}

/// Terminates the live session of a stream key whose token was reset or removed
#[derive(Clone)]
pub struct RevocationBridge {
    registry: Arc<dyn SessionRegistry>,
}

impl RevocationBridge {
    pub fn new(registry: Arc<dyn SessionRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<dyn SessionRegistry> {
        &self.registry
    }

    /// Returns whether a session was terminated. No live session is not an error.
    pub fn on_token_invalidated(&self, stream_key: &str) -> bool {
        match self.registry.find_session_by_stream_key(stream_key) {
            Some(session) => {
                info!(
                    stream_key = %stream_key,
                    connection_id = %session.host_connection_id,
                    "Terminating live session after credential change"
                );
                self.registry.terminate_session(&session.host_connection_id);
                true
            }
            None => {
                debug!(stream_key = %stream_key, "No live session to revoke");
                false
            }
        }
    }
}
