use crate::use_cases::{InMemoryRegistry, MessageRouter};

pub struct AppState {
    // Router owning the process-wide session registry.
    pub router: MessageRouter<InMemoryRegistry>,
    // Per-connection outbound queue size.
    pub outbound_capacity: usize,
}
