use crate::peer::manager::PeerConnectionManager;
use crate::peer::peer_link::{LinkEvent, Signal};
use tracing::{debug, info, warn};
use voicemesh_core::{RelayMessage, RoomId, SessionDescription, UserId};

impl PeerConnectionManager {
    pub async fn handle_relay_message(&mut self, msg: RelayMessage) {
        match msg {
            RelayMessage::Users { room, users } => {
                if self.is_other_room(&room) {
                    return;
                }
                self.on_roster(users).await;
            }
            RelayMessage::UserJoined { room, user } => {
                if self.is_other_room(&room) {
                    return;
                }
                self.on_user_joined(user).await;
            }
            RelayMessage::UserLeft { room, user } => {
                if self.is_other_room(&room) {
                    return;
                }
                self.on_user_left(user).await;
            }
            RelayMessage::Offer { from, offer } => self.on_offer(from, offer).await,
            RelayMessage::Answer { from, answer } => {
                self.on_signal(from, Signal::Answer(answer)).await
            }
            RelayMessage::Candidate { from, candidate } => {
                self.on_signal(from, Signal::Candidate(candidate)).await
            }
        }
    }

    fn is_other_room(&self, room: &RoomId) -> bool {
        if room != &self.room {
            warn!("Ignoring membership event for room {} (joined {})", room, self.room);
            return true;
        }
        false
    }

    /// The roster received at join: initiate toward everyone already present.
    async fn on_roster(&mut self, users: Vec<UserId>) {
        info!("Roster for {}: {} peers", self.room, users.len());

        for peer in users {
            if peer == self.local || self.links.contains_key(&peer) {
                continue;
            }
            if let Some(link) = self.open_link(&peer, None).await {
                self.links.insert(peer, link);
            }
        }
    }

    async fn on_user_joined(&mut self, user: UserId) {
        // A link that outlives a fresh join belongs to the peer's previous
        // session and can never complete again.
        if let Some(mut link) = self.links.remove(&user) {
            info!(
                "{} rejoined {}, dropping stale link {}",
                user,
                self.room,
                link.id()
            );
            link.close().await;
        }
        info!("{} joined {}, waiting for their offer", user, self.room);
    }

    async fn on_user_left(&mut self, user: UserId) {
        match self.links.remove(&user) {
            Some(mut link) => {
                info!("{} left {}, closing link {}", user, self.room, link.id());
                link.close().await;
            }
            None => debug!("{} left {} without a link", user, self.room),
        }
    }

    async fn on_offer(&mut self, from: UserId, offer: SessionDescription) {
        if from == self.local {
            warn!("Ignoring offer addressed from ourselves");
            return;
        }

        if self.links.contains_key(&from) {
            self.dispatch(&from, LinkEvent::SignalReceived(Signal::Offer(offer)))
                .await;
            return;
        }

        if let Some(link) = self.open_link(&from, Some(offer)).await {
            self.links.insert(from, link);
        }
    }

    async fn on_signal(&mut self, from: UserId, signal: Signal) {
        if !self.links.contains_key(&from) {
            debug!("No link to {}, dropping {:?}", from, signal);
            return;
        }
        self.dispatch(&from, LinkEvent::SignalReceived(signal)).await;
    }
}
