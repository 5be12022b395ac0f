// Connection lifecycle: identity assignment on open, departure notice on close.

use crate::domain::{ClientId, Outbound};
use crate::use_cases::registry::SessionRegistry;
use crate::use_cases::router::{Delivery, MessageRouter, RouteOutcome, Target};
use crate::use_cases::session::{ConnectionHandle, SendOutcome};
use tracing::{info, warn};

/// Registers a freshly accepted connection and queues its `init` envelope.
///
/// The handle is FIFO, so `init` reaches the client ahead of any relayed traffic.
pub async fn open_session<R>(router: &MessageRouter<R>, handle: ConnectionHandle) -> ClientId
where
    R: SessionRegistry,
{
    let id = router.registry().register(handle.clone()).await;

    if let Some(frame) = router.encode(Outbound::Init { id }) {
        let outcome = handle.try_deliver(frame);
        if outcome != SendOutcome::Delivered {
            // The read loop will observe the close and run the normal teardown.
            warn!(client_id = %id, ?outcome, "failed to queue init message");
        }
    }

    // Resolve the count before logging; the log call must not span an await.
    let sessions = router.registry().session_count().await;
    info!(client_id = %id, sessions, "client connected");
    id
}

/// Removes the session, then tells every remaining player it left.
///
/// Unregistering first guarantees no lookup can resolve the departed id while
/// the notice is in flight.
pub async fn close_session<R>(router: &MessageRouter<R>, id: ClientId) -> RouteOutcome
where
    R: SessionRegistry,
{
    if !router.registry().unregister(&id).await {
        // Already torn down; a second notice would duplicate the first.
        warn!(client_id = %id, "session already removed before close");
        return RouteOutcome::default();
    }

    let outcome = router
        .deliver(Delivery {
            target: Target::AllExcept(None),
            message: Outbound::Disconnect { id },
        })
        .await;

    info!(client_id = %id, notified = outcome.delivered, "client disconnected");
    outcome
}
