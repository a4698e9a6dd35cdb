use crate::transport::transport_event::TransportEvent;
use anyhow::Result;
use async_trait::async_trait;
use std::fmt;
use tokio::sync::mpsc;
use voicemesh_core::{IceCandidate, SessionDescription, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    New,
    Connecting,
    Connected,
    Disconnected,
    Failed,
    Closed,
}

impl ConnectionState {
    /// States after which the link is torn down.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ConnectionState::Disconnected | ConnectionState::Failed | ConnectionState::Closed
        )
    }
}

/// Identifies one PeerLink instance; never reused within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LinkId(pub u64);

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The negotiation surface of one peer connection.
#[async_trait]
pub trait PeerTransport: Send + Sync {
    async fn create_offer(&self) -> Result<SessionDescription>;

    async fn create_answer(&self) -> Result<SessionDescription>;

    async fn set_local_description(&self, desc: SessionDescription) -> Result<()>;

    async fn set_remote_description(&self, desc: SessionDescription) -> Result<()>;

    async fn add_candidate(&self, candidate: IceCandidate) -> Result<()>;

    fn connection_state(&self) -> ConnectionState;

    async fn close(&self) -> Result<()>;
}

/// Builds one transport per PeerLink. The transport reports asynchronous
/// happenings (candidates, state, tracks) through `events`.
#[async_trait]
pub trait TransportFactory: Send + Sync {
    async fn create(
        &self,
        peer: &UserId,
        link: LinkId,
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<Box<dyn PeerTransport>>;
}
