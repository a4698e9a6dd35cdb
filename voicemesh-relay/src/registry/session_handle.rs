use std::fmt;
use tokio::sync::mpsc;
use uuid::Uuid;
use voicemesh_core::RelayMessage;

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Relay-side reference to one connected client's outbound queue.
///
/// Every message pushed through a handle lands in a single FIFO drained by the
/// socket writer, so the order of `send` calls is the order the client observes.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    id: SessionId,
    tx: mpsc::UnboundedSender<RelayMessage>,
}

impl SessionHandle {
    pub fn new(tx: mpsc::UnboundedSender<RelayMessage>) -> Self {
        Self {
            id: SessionId::new(),
            tx,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Returns `false` when the client side of the queue is already gone.
    pub fn send(&self, msg: RelayMessage) -> bool {
        self.tx.send(msg).is_ok()
    }
}
