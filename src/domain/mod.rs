// Domain layer: identities and the envelopes relayed between players.

pub mod envelope;
pub mod session;

pub use envelope::{Inbound, Outbound};
pub use session::ClientId;
