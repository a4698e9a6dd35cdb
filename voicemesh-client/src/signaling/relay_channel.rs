use crate::error::ClientError;
use async_trait::async_trait;
use tokio::sync::mpsc;
use voicemesh_core::{ClientMessage, RelayMessage};

/// An open signaling channel to the relay.
///
/// Dropping `outbound` closes the underlying connection. `inbound` yields
/// `None` once the relay side is gone.
pub struct RelayChannel {
    pub outbound: mpsc::UnboundedSender<ClientMessage>,
    pub inbound: mpsc::UnboundedReceiver<RelayMessage>,
}

#[async_trait]
pub trait RelayConnector: Send + Sync {
    /// Fails with [`ClientError::ChannelUnavailable`] when the relay cannot be reached.
    async fn connect(&self, url: &str) -> Result<RelayChannel, ClientError>;
}
