// Domain-level envelopes: what players ask the relay to forward, and what it sends.
// Gameplay values stay opaque JSON; the relay never interprets them.

use super::session::ClientId;
use serde_json::Value;

/// A well-formed inbound envelope, already decoded from the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Move {
        position: Value,
        rotation_y: Value,
        state: Value,
    },
    DuelRequest {
        to: String,
        from: Value,
    },
    DuelAccepted {
        to: String,
        from: Value,
    },
    HealthUpdate {
        id: Value,
        health: Value,
    },
    DuelAttack {
        to: String,
        from: Value,
        damage: Value,
    },
    DuelEnd {
        loser_id: Value,
        winner_id: String,
    },
}

/// An envelope the relay delivers to one or more players.
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    Init {
        id: ClientId,
    },
    PlayerUpdate {
        id: ClientId,
        position: Value,
        rotation_y: Value,
        state: Value,
    },
    DuelInvite {
        from: Value,
    },
    DuelAccepted {
        from: Value,
    },
    HealthUpdate {
        id: Value,
        health: Value,
    },
    ApplyDamage {
        from: Value,
        damage: Value,
    },
    DuelEnd {
        loser_id: Value,
        winner_id: String,
    },
    Disconnect {
        id: ClientId,
    },
}
