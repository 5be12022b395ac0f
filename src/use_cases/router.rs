// Message routing: decides who receives each inbound envelope and delivers it.
// The router keeps no memory between messages; duel flow is trusted to clients.

use crate::domain::{ClientId, Inbound, Outbound};
use crate::use_cases::registry::SessionRegistry;
use crate::use_cases::session::{ClientSession, SendOutcome};
use axum::extract::ws::Utf8Bytes;
use std::sync::Arc;
use tracing::{debug, error};

/// Who an outbound envelope is addressed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Every registered session except the given id (if any).
    AllExcept(Option<ClientId>),
    /// Exactly one session.
    One(ClientId),
}

/// A routing decision: one outbound envelope and its audience.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub target: Target,
    pub message: Outbound,
}

/// Per-message delivery counts, used for logging and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteOutcome {
    pub delivered: usize,
    // Recipients that were closing or too slow to accept the frame.
    pub skipped: usize,
}

/// Maps one inbound envelope to its delivery, without touching the registry.
///
/// Returns `None` when a targeted envelope names an id that cannot belong to
/// any session.
pub fn plan(sender: ClientId, inbound: Inbound) -> Option<Delivery> {
    let delivery = match inbound {
        Inbound::Move {
            position,
            rotation_y,
            state,
        } => Delivery {
            target: Target::AllExcept(Some(sender)),
            message: Outbound::PlayerUpdate {
                id: sender,
                position,
                rotation_y,
                state,
            },
        },
        // Excludes the player named in the payload, which may not be the sender.
        Inbound::HealthUpdate { id, health } => Delivery {
            target: Target::AllExcept(id.as_str().and_then(ClientId::parse)),
            message: Outbound::HealthUpdate { id, health },
        },
        Inbound::DuelRequest { to, from } => Delivery {
            target: Target::One(ClientId::parse(&to)?),
            message: Outbound::DuelInvite { from },
        },
        Inbound::DuelAccepted { to, from } => Delivery {
            target: Target::One(ClientId::parse(&to)?),
            message: Outbound::DuelAccepted { from },
        },
        Inbound::DuelAttack { to, from, damage } => Delivery {
            target: Target::One(ClientId::parse(&to)?),
            message: Outbound::ApplyDamage { from, damage },
        },
        Inbound::DuelEnd {
            loser_id,
            winner_id,
        } => Delivery {
            target: Target::One(ClientId::parse(&winner_id)?),
            message: Outbound::DuelEnd {
                loser_id,
                winner_id,
            },
        },
    };
    Some(delivery)
}

// Port for turning outbound envelopes into wire frames.
pub trait FrameEncoder: Send + Sync {
    fn encode(&self, message: Outbound) -> Result<Utf8Bytes, String>;
}

/// Routes envelopes through an injected session registry and frame encoder.
pub struct MessageRouter<R> {
    registry: Arc<R>,
    // We use Arc<dyn Trait> so the wire format stays an adapter concern.
    encoder: Arc<dyn FrameEncoder>,
}

impl<R> MessageRouter<R>
where
    R: SessionRegistry,
{
    pub fn new(registry: Arc<R>, encoder: Arc<dyn FrameEncoder>) -> Self {
        Self { registry, encoder }
    }

    pub fn registry(&self) -> &Arc<R> {
        &self.registry
    }

    /// Handles one inbound envelope from `sender`.
    pub async fn route(&self, sender: ClientId, inbound: Inbound) -> RouteOutcome {
        match plan(sender, inbound) {
            Some(delivery) => self.deliver(delivery).await,
            None => {
                debug!(%sender, "target id is not a client id; dropping");
                RouteOutcome::default()
            }
        }
    }

    /// Serializes one envelope; failures are logged and yield `None`.
    pub fn encode(&self, message: Outbound) -> Option<Utf8Bytes> {
        self.encoder
            .encode(message)
            .inspect_err(|e| error!(error = %e, "failed to serialize outbound message"))
            .ok()
    }

    /// Encodes the envelope once and pushes it to every resolved recipient.
    pub async fn deliver(&self, delivery: Delivery) -> RouteOutcome {
        let Some(frame) = self.encode(delivery.message) else {
            return RouteOutcome::default();
        };

        let recipients: Vec<ClientSession> = match delivery.target {
            Target::AllExcept(exclude) => self.registry.snapshot_except(exclude.as_ref()).await,
            Target::One(id) => match self.registry.get(&id).await {
                Some(session) => vec![session],
                None => {
                    // Asynchronous disconnects make this a normal outcome.
                    debug!(target_id = %id, "target not connected; dropping");
                    return RouteOutcome::default();
                }
            },
        };

        let mut outcome = RouteOutcome::default();
        for session in recipients {
            if !session.handle.is_writable() {
                outcome.skipped += 1;
                continue;
            }
            match session.handle.try_deliver(frame.clone()) {
                SendOutcome::Delivered => outcome.delivered += 1,
                SendOutcome::Full => {
                    debug!(recipient = %session.id, "outbound queue full; skipping recipient");
                    outcome.skipped += 1;
                }
                SendOutcome::Closed => outcome.skipped += 1,
            }
        }
        outcome
    }
}
