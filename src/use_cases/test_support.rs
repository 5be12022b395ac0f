use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::extract::ws::Utf8Bytes;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::domain::ClientId;
use crate::interface_adapters::protocol::JsonEncoder;
use crate::use_cases::registry::SessionRegistry;
use crate::use_cases::router::MessageRouter;
use crate::use_cases::session::{ClientSession, ConnectionHandle};

pub(crate) type SessionTable = Arc<Mutex<HashMap<ClientId, ClientSession>>>;

// Minimal fake registry that also records unregister calls in order.
#[derive(Clone, Default)]
pub(crate) struct RecordingRegistry {
    sessions: SessionTable,
    unregistered: Arc<Mutex<Vec<ClientId>>>,
}

impl RecordingRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn unregistered(&self) -> Vec<ClientId> {
        self.unregistered
            .lock()
            .expect("unregistered mutex poisoned")
            .clone()
    }

    pub(crate) fn contains(&self, id: &ClientId) -> bool {
        self.sessions
            .lock()
            .expect("sessions mutex poisoned")
            .contains_key(id)
    }
}

#[async_trait]
impl SessionRegistry for RecordingRegistry {
    async fn register(&self, handle: ConnectionHandle) -> ClientId {
        let id = ClientId::new_random();
        let mut guard = self.sessions.lock().expect("sessions mutex poisoned");
        guard.insert(id, ClientSession { id, handle });
        id
    }

    async fn unregister(&self, id: &ClientId) -> bool {
        self.unregistered
            .lock()
            .expect("unregistered mutex poisoned")
            .push(*id);
        let mut guard = self.sessions.lock().expect("sessions mutex poisoned");
        guard.remove(id).is_some()
    }

    async fn get(&self, id: &ClientId) -> Option<ClientSession> {
        let guard = self.sessions.lock().expect("sessions mutex poisoned");
        guard.get(id).cloned()
    }

    async fn snapshot_except(&self, exclude: Option<&ClientId>) -> Vec<ClientSession> {
        let guard = self.sessions.lock().expect("sessions mutex poisoned");
        guard
            .values()
            .filter(|session| Some(&session.id) != exclude)
            .cloned()
            .collect()
    }

    async fn session_count(&self) -> usize {
        self.sessions.lock().expect("sessions mutex poisoned").len()
    }
}

// Registers a client directly and hands back the queue its writer would drain.
pub(crate) async fn open_client<R: SessionRegistry>(
    registry: &R,
) -> (ClientId, mpsc::Receiver<Utf8Bytes>) {
    let (handle, rx) = ConnectionHandle::channel(16);
    let id = registry.register(handle).await;
    (id, rx)
}

// Collects every frame queued so far as parsed JSON.
pub(crate) fn drain_json(rx: &mut mpsc::Receiver<Utf8Bytes>) -> Vec<Value> {
    let mut frames = Vec::new();
    while let Ok(frame) = rx.try_recv() {
        frames.push(serde_json::from_str(frame.as_str()).expect("queued frame should be json"));
    }
    frames
}

// Router over the given registry that speaks the real JSON wire format.
pub(crate) fn json_router<R: SessionRegistry>(registry: R) -> MessageRouter<R> {
    MessageRouter::new(Arc::new(registry), Arc::new(JsonEncoder))
}
