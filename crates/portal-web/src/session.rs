//! Session manager collaborator seam.
//!
//! The real session layer (cookies, expiry, persistence) is outside this
//! repository.  The bootstrap only needs to initialize it and hand it to the
//! controller layer; [`MemorySessionStore`] is the in-process implementation
//! the shipped binary wires in.

use std::collections::HashMap;
use std::sync::Mutex;

use uuid::Uuid;

/// The external session-manager interface the bootstrap depends on.
pub trait SessionManager: Send + Sync {
    /// One-time initialization.  `false` aborts the bootstrap.
    fn init(&self) -> bool;

    /// Creates a session for `user` and returns its opaque id.
    fn create_session(&self, user: &str) -> String;

    /// Returns the user bound to `session_id`, if the session exists.
    fn lookup(&self, session_id: &str) -> Option<String>;
}

/// In-process session table keyed by random v4 UUIDs.
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionManager for MemorySessionStore {
    fn init(&self) -> bool {
        self.sessions.lock().expect("session lock poisoned").clear();
        true
    }

    fn create_session(&self, user: &str) -> String {
        let id = Uuid::new_v4().to_string();
        self.sessions
            .lock()
            .expect("session lock poisoned")
            .insert(id.clone(), user.to_string());
        id
    }

    fn lookup(&self, session_id: &str) -> Option<String> {
        self.sessions
            .lock()
            .expect("session lock poisoned")
            .get(session_id)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_created_session_is_retrievable() {
        // Arrange
        let store = MemorySessionStore::new();
        assert!(store.init());

        // Act
        let id = store.create_session("admin");

        // Assert
        assert_eq!(store.lookup(&id), Some("admin".to_string()));
    }

    #[test]
    fn test_unknown_session_id_yields_none() {
        let store = MemorySessionStore::new();
        assert!(store.init());
        assert_eq!(store.lookup("no-such-session"), None);
    }

    #[test]
    fn test_init_clears_existing_sessions() {
        let store = MemorySessionStore::new();
        let id = store.create_session("admin");

        assert!(store.init());

        assert_eq!(store.lookup(&id), None);
    }

    #[test]
    fn test_session_ids_are_unique() {
        let store = MemorySessionStore::new();
        let a = store.create_session("admin");
        let b = store.create_session("admin");
        assert_ne!(a, b);
    }
}
