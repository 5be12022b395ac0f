// Interface adapters: wire protocol and WebSocket connection handling.

pub mod net;
pub mod protocol;
pub mod state;
