// Use cases layer: session bookkeeping and message routing for the relay.

pub mod lifecycle;
pub mod registry;
pub mod router;
pub mod session;

#[cfg(test)]
pub(crate) mod test_support;

pub use lifecycle::{close_session, open_session};
pub use registry::{InMemoryRegistry, SessionRegistry};
pub use router::{Delivery, FrameEncoder, MessageRouter, RouteOutcome, Target};
pub use session::{ClientSession, ConnectionHandle, SendOutcome};
