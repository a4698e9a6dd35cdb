use crate::error::ClientError;
use crate::media::AudioOutput;
use crate::peer::link_state::{LinkState, Role};
use crate::peer::peer_link::{LinkEvent, PeerLink};
use crate::signaling::SignalSender;
use crate::transport::{LinkId, TransportEvent, TransportFactory};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};
use voicemesh_core::{RoomId, SessionDescription, UserId};

mod handle_relay_impl;
mod handle_transport_impl;

/// Point-in-time view of one active link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerSnapshot {
    pub peer: UserId,
    pub role: Role,
    pub state: LinkState,
}

/// Owns every [`PeerLink`] of the local session in one room.
///
/// Not shared: the session engine drives it from a single task, so handlers
/// always see the link table as the previous event left it.
pub struct PeerConnectionManager {
    room: RoomId,
    local: UserId,
    links: HashMap<UserId, PeerLink>,
    factory: Arc<dyn TransportFactory>,
    output: Arc<dyn AudioOutput>,
    signals: SignalSender,
    events_tx: mpsc::Sender<TransportEvent>,
    next_link: u64,
}

impl PeerConnectionManager {
    pub fn new(
        room: RoomId,
        signals: SignalSender,
        factory: Arc<dyn TransportFactory>,
        output: Arc<dyn AudioOutput>,
        events_tx: mpsc::Sender<TransportEvent>,
    ) -> Self {
        Self {
            room,
            local: signals.local().clone(),
            links: HashMap::new(),
            factory,
            output,
            signals,
            events_tx,
            next_link: 0,
        }
    }

    pub fn room(&self) -> &RoomId {
        &self.room
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn snapshot(&self) -> Vec<PeerSnapshot> {
        let mut peers: Vec<PeerSnapshot> = self
            .links
            .values()
            .map(|link| PeerSnapshot {
                peer: link.remote().clone(),
                role: link.role(),
                state: link.state(),
            })
            .collect();
        peers.sort_by(|a, b| a.peer.cmp(&b.peer));
        peers
    }

    /// Tears down every link.
    pub async fn close_all(&mut self) {
        let count = self.links.len();
        for (_, mut link) in self.links.drain() {
            let _ = link.handle(LinkEvent::LocalStop).await;
        }
        info!("Closed {} peer links in room {}", count, self.room);
    }

    fn allocate_link(&mut self) -> LinkId {
        self.next_link += 1;
        LinkId(self.next_link)
    }

    /// `None` when the link could not be set up; the failure is logged and
    /// nothing else is affected.
    async fn open_link(
        &mut self,
        peer: &UserId,
        offer: Option<SessionDescription>,
    ) -> Option<PeerLink> {
        let id = self.allocate_link();

        let transport = match self
            .factory
            .create(peer, id, self.events_tx.clone())
            .await
        {
            Ok(transport) => transport,
            Err(e) => {
                warn!("{}", ClientError::negotiation(peer, "create transport", e));
                return None;
            }
        };
        let sink = self.output.create_sink(peer);

        let result = match offer {
            None => {
                PeerLink::initiator(peer.clone(), id, transport, sink, self.signals.clone()).await
            }
            Some(offer) => {
                let signals = self.signals.clone();
                PeerLink::responder(peer.clone(), id, transport, sink, signals, offer).await
            }
        };

        match result {
            Ok(link) => Some(link),
            Err(e) => {
                warn!("{}", e);
                None
            }
        }
    }

    /// Feeds `event` to the link for `peer` and drops the link if it closed or failed.
    async fn dispatch(&mut self, peer: &UserId, event: LinkEvent) {
        let Some(link) = self.links.get_mut(peer) else {
            return;
        };

        if let Err(e) = link.handle(event).await {
            warn!("{}", e);
            link.close().await;
        }

        if link.is_closed() {
            self.links.remove(peer);
        }
    }
}
