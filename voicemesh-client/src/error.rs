use thiserror::Error;
use voicemesh_core::UserId;

/// Failures surfaced by the voice client.
///
/// Only `CaptureUnavailable` and `ChannelUnavailable` ever reach the caller of
/// [`ClientSession::start`](crate::ClientSession::start). `PeerNegotiation` is
/// contained to one link and only logged.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Audio device missing or permission denied.
    #[error("Audio capture unavailable: {0}")]
    CaptureUnavailable(String),

    /// Signaling channel to the relay could not be established.
    #[error("Relay channel unavailable: {0}")]
    ChannelUnavailable(String),

    /// Offer, answer or candidate handling failed for one peer.
    #[error("Negotiation with {peer} failed during {stage}: {reason}")]
    PeerNegotiation {
        peer: UserId,
        stage: &'static str,
        reason: String,
    },

    /// The session engine is no longer running.
    #[error("Voice session is stopped")]
    Stopped,
}

impl ClientError {
    pub(crate) fn negotiation(peer: &UserId, stage: &'static str, err: anyhow::Error) -> Self {
        Self::PeerNegotiation {
            peer: peer.clone(),
            stage,
            reason: format!("{:#}", err),
        }
    }
}
