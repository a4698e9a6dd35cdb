use crate::registry::{Registry, SessionHandle};
use crate::relay::relay_session::RelaySession;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;
use voicemesh_core::{RelayMessage, UserId};

/// Routes addressed signaling between connected sessions.
///
/// Cheap to clone; every clone shares one [`Registry`].
#[derive(Clone, Default)]
pub struct Relay {
    registry: Arc<Registry>,
}

impl Relay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Attaches a new client connection. Messages for it arrive on the returned receiver.
    pub fn open_session(&self) -> (RelaySession, mpsc::UnboundedReceiver<RelayMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let session = RelaySession::new(self.clone(), SessionHandle::new(tx));
        (session, rx)
    }

    /// Fire-and-forget delivery to `to`. Unknown targets are dropped silently;
    /// the peer may have left in the middle of a handshake.
    pub fn forward(&self, to: &UserId, msg: RelayMessage) -> bool {
        let Some(handle) = self.registry.lookup(to) else {
            debug!("Dropping signal for unregistered user {}", to);
            return false;
        };
        handle.send(msg)
    }
}
