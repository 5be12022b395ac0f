use crate::domain::ClientId;
use axum::extract::ws::Utf8Bytes;
use tokio::sync::mpsc;

/// Result of pushing one frame onto a connection's outbound queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Delivered,
    // Recipient is not draining fast enough; the frame is skipped.
    Full,
    // Writer task is gone; the connection is closing.
    Closed,
}

/// Send side of a connection's outbound queue.
///
/// The receiving end is owned by the connection's writer task, which forwards
/// frames to the socket. Once that task exits the handle stops being writable.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    tx: mpsc::Sender<Utf8Bytes>,
}

impl ConnectionHandle {
    pub fn new(tx: mpsc::Sender<Utf8Bytes>) -> Self {
        Self { tx }
    }

    /// Creates a handle together with the queue its writer task should drain.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Utf8Bytes>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self::new(tx), rx)
    }

    pub fn is_writable(&self) -> bool {
        !self.tx.is_closed()
    }

    /// Fire-and-forget send; never waits on a slow recipient.
    pub fn try_deliver(&self, frame: Utf8Bytes) -> SendOutcome {
        match self.tx.try_send(frame) {
            Ok(()) => SendOutcome::Delivered,
            Err(mpsc::error::TrySendError::Full(_)) => SendOutcome::Full,
            Err(mpsc::error::TrySendError::Closed(_)) => SendOutcome::Closed,
        }
    }
}

/// One connected player: its identity plus the handle used to reach it.
#[derive(Debug, Clone)]
pub struct ClientSession {
    pub id: ClientId,
    pub handle: ConnectionHandle,
}
