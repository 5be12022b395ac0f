// Connection registry: the set of live sessions and the only shared mutable state.

use crate::domain::ClientId;
use crate::use_cases::session::{ClientSession, ConnectionHandle};
use async_trait::async_trait;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use tokio::sync::RwLock;

// Port for session storage used by the router and connection lifecycle.
#[async_trait]
pub trait SessionRegistry: Send + Sync {
    /// Stores a new session for the handle and returns its freshly assigned id.
    async fn register(&self, handle: ConnectionHandle) -> ClientId;
    /// Removes the session if present. Returns false when it was already gone.
    async fn unregister(&self, id: &ClientId) -> bool;
    async fn get(&self, id: &ClientId) -> Option<ClientSession>;
    /// Snapshot of every session except `exclude`, taken at call time.
    ///
    /// The snapshot is owned, so callers iterate it without holding any lock and
    /// concurrent register/unregister calls cannot disturb the iteration.
    async fn snapshot_except(&self, exclude: Option<&ClientId>) -> Vec<ClientSession>;
    async fn session_count(&self) -> usize;
}

/// Thread-safe in-memory registry for live sessions.
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    /// Map of client id to its session.
    sessions: RwLock<HashMap<ClientId, ClientSession>>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRegistry for InMemoryRegistry {
    async fn register(&self, handle: ConnectionHandle) -> ClientId {
        let mut sessions = self.sessions.write().await;
        loop {
            let id = ClientId::new_random();
            if let Entry::Vacant(slot) = sessions.entry(id) {
                slot.insert(ClientSession { id, handle });
                return id;
            }
        }
    }

    async fn unregister(&self, id: &ClientId) -> bool {
        let mut sessions = self.sessions.write().await;
        sessions.remove(id).is_some()
    }

    async fn get(&self, id: &ClientId) -> Option<ClientSession> {
        let sessions = self.sessions.read().await;
        sessions.get(id).cloned()
    }

    async fn snapshot_except(&self, exclude: Option<&ClientId>) -> Vec<ClientSession> {
        let sessions = self.sessions.read().await;
        sessions
            .values()
            .filter(|session| Some(&session.id) != exclude)
            .cloned()
            .collect()
    }

    async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
