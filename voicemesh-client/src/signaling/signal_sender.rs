use tokio::sync::mpsc;
use tracing::warn;
use voicemesh_core::{ClientMessage, IceCandidate, RoomId, SessionDescription, UserId};

/// Stamps outgoing frames with the local user id.
#[derive(Clone)]
pub struct SignalSender {
    local: UserId,
    tx: mpsc::UnboundedSender<ClientMessage>,
}

impl SignalSender {
    pub fn new(local: UserId, tx: mpsc::UnboundedSender<ClientMessage>) -> Self {
        Self { local, tx }
    }

    pub fn local(&self) -> &UserId {
        &self.local
    }

    pub fn send_join(&self, room: &RoomId) {
        self.send(ClientMessage::Join {
            room: room.clone(),
            user: self.local.clone(),
        });
    }

    pub fn send_leave(&self, room: &RoomId) {
        self.send(ClientMessage::Leave {
            room: room.clone(),
            user: self.local.clone(),
        });
    }

    pub fn send_offer(&self, to: &UserId, offer: SessionDescription) {
        self.send(ClientMessage::Offer {
            to: to.clone(),
            from: self.local.clone(),
            offer,
        });
    }

    pub fn send_answer(&self, to: &UserId, answer: SessionDescription) {
        self.send(ClientMessage::Answer {
            to: to.clone(),
            from: self.local.clone(),
            answer,
        });
    }

    pub fn send_candidate(&self, to: &UserId, candidate: IceCandidate) {
        self.send(ClientMessage::Candidate {
            to: to.clone(),
            from: self.local.clone(),
            candidate,
        });
    }

    fn send(&self, msg: ClientMessage) {
        if self.tx.send(msg).is_err() {
            warn!("Relay channel closed, dropping outbound signal");
        }
    }
}
