// Player identity assigned by the relay at connection time.

use std::fmt;
use uuid::Uuid;

/// Opaque identity of one connected player.
///
/// Random 128-bit ids never collide in practice, so no coordination is needed
/// between connections allocating them concurrently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(Uuid);

impl ClientId {
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Resolves an id carried in a client payload; anything that is not a
    /// UUID string cannot name a live session.
    pub fn parse(raw: &str) -> Option<Self> {
        Uuid::parse_str(raw).ok().map(Self)
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
