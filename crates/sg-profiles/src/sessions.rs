//! In-process session registry
//!
//! Stands in for the media engine when none is attached, and doubles as a
//! recording fake in tests.

use parking_lot::Mutex;

use crate::revocation::{SessionHandle, SessionRegistry};

#[derive(Default)]
pub struct InMemorySessionRegistry {
    sessions: Mutex<Vec<SessionHandle>>,
    terminated: Mutex<Vec<String>>,
}

impl InMemorySessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a publisher connection to a stream key, replacing any previous one
    pub fn register(&self, stream_key: impl Into<String>, host_connection_id: impl Into<String>) {
        let handle = SessionHandle::new(stream_key, host_connection_id);
        let mut sessions = self.sessions.lock();
        sessions.retain(|s| s.stream_key != handle.stream_key);
        sessions.push(handle);
    }

    pub fn unregister(&self, stream_key: &str) -> Option<SessionHandle> {
        let mut sessions = self.sessions.lock();
        let index = sessions.iter().position(|s| s.stream_key == stream_key)?;
        Some(sessions.remove(index))
    }

    /// Connection ids passed to `terminate_session`, in call order
    pub fn terminated(&self) -> Vec<String> {
        self.terminated.lock().clone()
    }
}

impl SessionRegistry for InMemorySessionRegistry {
    fn find_session_by_stream_key(&self, stream_key: &str) -> Option<SessionHandle> {
        self.sessions
            .lock()
            .iter()
            .find(|s| s.stream_key == stream_key)
            .cloned()
    }

    fn terminate_session(&self, host_connection_id: &str) {
        self.sessions
            .lock()
            .retain(|s| s.host_connection_id != host_connection_id);
        self.terminated.lock().push(host_connection_id.to_string());
    }

    fn active_sessions(&self) -> Vec<SessionHandle> {
        self.sessions.lock().clone()
    }
}
