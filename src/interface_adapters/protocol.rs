// Wire protocol DTOs and conversions for relay messages.
// Envelopes are flat JSON objects discriminated by a camelCase `type` field.

use crate::domain::{Inbound, Outbound};
use crate::use_cases::FrameEncoder;
use axum::extract::ws::Utf8Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Messages clients send to the relay.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    // Continuous position sync; optional fields fall back to defaults.
    Move {
        position: Value,
        #[serde(default)]
        rotation_y: Option<Value>,
        #[serde(default)]
        state: Option<Value>,
    },
    DuelRequest {
        to: String,
        from: Value,
    },
    DuelAccepted {
        to: String,
        from: Value,
    },
    // `id` names the player whose health changed, not necessarily the sender.
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

/// Messages the relay sends to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    // Identity assigned to the connection, sent before any other traffic.
    Init {
        id: String,
    },
    PlayerUpdate {
        id: String,
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
        id: String,
    },
}

const DEFAULT_ROTATION_Y: i64 = 0;
const DEFAULT_STATE: &str = "idle";

// Clients send `false`, `0`, `""` or `null` to mean "not set", same as omitting the field.
fn is_unset(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

fn or_default(value: Option<Value>, default: impl FnOnce() -> Value) -> Value {
    value.filter(|v| !is_unset(v)).unwrap_or_else(default)
}

impl From<ClientMessage> for Inbound {
    fn from(message: ClientMessage) -> Self {
        match message {
            ClientMessage::Move {
                position,
                rotation_y,
                state,
            } => Inbound::Move {
                position,
                rotation_y: or_default(rotation_y, || Value::from(DEFAULT_ROTATION_Y)),
                state: or_default(state, || Value::from(DEFAULT_STATE)),
            },
            ClientMessage::DuelRequest { to, from } => Inbound::DuelRequest { to, from },
            ClientMessage::DuelAccepted { to, from } => Inbound::DuelAccepted { to, from },
            ClientMessage::HealthUpdate { id, health } => Inbound::HealthUpdate { id, health },
            ClientMessage::DuelAttack { to, from, damage } => {
                Inbound::DuelAttack { to, from, damage }
            }
            ClientMessage::DuelEnd {
                loser_id,
                winner_id,
            } => Inbound::DuelEnd {
                loser_id,
                winner_id,
            },
        }
    }
}

impl From<Outbound> for ServerMessage {
    fn from(message: Outbound) -> Self {
        match message {
            Outbound::Init { id } => ServerMessage::Init { id: id.to_string() },
            Outbound::PlayerUpdate {
                id,
                position,
                rotation_y,
                state,
            } => ServerMessage::PlayerUpdate {
                id: id.to_string(),
                position,
                rotation_y,
                state,
            },
            Outbound::DuelInvite { from } => ServerMessage::DuelInvite { from },
            Outbound::DuelAccepted { from } => ServerMessage::DuelAccepted { from },
            Outbound::HealthUpdate { id, health } => ServerMessage::HealthUpdate { id, health },
            Outbound::ApplyDamage { from, damage } => ServerMessage::ApplyDamage { from, damage },
            Outbound::DuelEnd {
                loser_id,
                winner_id,
            } => ServerMessage::DuelEnd {
                loser_id,
                winner_id,
            },
            Outbound::Disconnect { id } => ServerMessage::Disconnect { id: id.to_string() },
        }
    }
}

/// Parses one inbound frame. Any failure means the frame is malformed.
pub fn decode(text: &str) -> Result<Inbound, serde_json::Error> {
    serde_json::from_str::<ClientMessage>(text).map(Inbound::from)
}

/// Serializes an outbound envelope once so every recipient can share the bytes.
pub fn encode(message: Outbound) -> Result<Utf8Bytes, serde_json::Error> {
    let txt = serde_json::to_string(&ServerMessage::from(message))?;
    Ok(Utf8Bytes::from(txt))
}

/// JSON wire encoder handed to the router.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEncoder;

impl FrameEncoder for JsonEncoder {
    fn encode(&self, message: Outbound) -> Result<Utf8Bytes, String> {
        encode(message).map_err(|e| e.to_string())
    }
}
