use crate::peer::manager::PeerConnectionManager;
use crate::peer::peer_link::LinkEvent;
use crate::transport::TransportEvent;
use tracing::debug;

impl PeerConnectionManager {
    pub async fn on_transport_event(&mut self, event: TransportEvent) {
        let current = self.links.get(event.peer()).map(|link| link.id());
        if current != Some(event.link()) {
            debug!(
                "Dropping event from stale link {} to {}",
                event.link(),
                event.peer()
            );
            return;
        }

        match event {
            TransportEvent::CandidateGenerated {
                peer, candidate, ..
            } => {
                if let Some(link) = self.links.get(&peer) {
                    link.forward_local_candidate(candidate);
                }
            }
            TransportEvent::StateChanged { peer, state, .. } => {
                self.dispatch(&peer, LinkEvent::TransportStateChanged(state))
                    .await;
            }
            TransportEvent::TrackAvailable { peer, track, .. } => {
                self.dispatch(&peer, LinkEvent::TrackAvailable(track)).await;
            }
        }
    }
}
