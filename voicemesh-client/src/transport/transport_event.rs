use crate::media::RemoteAudioTrack;
use crate::transport::peer_transport::{ConnectionState, LinkId};
use std::sync::Arc;
use voicemesh_core::{IceCandidate, UserId};

/// Events a transport emits for the session engine.
///
/// Every event names the link instance that produced it so that late events
/// from a torn-down link never reach a newer link for the same peer.
pub enum TransportEvent {
    /// A local ICE candidate was discovered and must be trickled to the peer.
    CandidateGenerated {
        peer: UserId,
        link: LinkId,
        candidate: IceCandidate,
    },

    StateChanged {
        peer: UserId,
        link: LinkId,
        state: ConnectionState,
    },

    /// Remote audio is flowing and can be attached to a sink.
    TrackAvailable {
        peer: UserId,
        link: LinkId,
        track: Arc<dyn RemoteAudioTrack>,
    },
}

impl TransportEvent {
    pub fn peer(&self) -> &UserId {
        match self {
            TransportEvent::CandidateGenerated { peer, .. }
            | TransportEvent::StateChanged { peer, .. }
            | TransportEvent::TrackAvailable { peer, .. } => peer,
        }
    }

    pub fn link(&self) -> LinkId {
        match self {
            TransportEvent::CandidateGenerated { link, .. }
            | TransportEvent::StateChanged { link, .. }
            | TransportEvent::TrackAvailable { link, .. } => *link,
        }
    }
}
