use crate::registry::{SessionHandle, SessionId};
use crate::relay::relay::Relay;
use tracing::{info, warn};
use voicemesh_core::{ClientMessage, RelayMessage, RoomId, UserId};

/// Relay-side state of one client connection.
///
/// Remembers which `(room, user)` memberships this connection created so the
/// disconnect path can undo exactly those. Dropping the session disconnects it.
pub struct RelaySession {
    relay: Relay,
    handle: SessionHandle,
    joined: Vec<(RoomId, UserId)>,
}

impl RelaySession {
    pub(crate) fn new(relay: Relay, handle: SessionHandle) -> Self {
        Self {
            relay,
            handle,
            joined: Vec::new(),
        }
    }

    pub fn id(&self) -> SessionId {
        self.handle.id()
    }

    pub fn handle(&mut self, msg: ClientMessage) {
        match msg {
            ClientMessage::Join { room, user } => {
                self.relay.registry().join(&room, &user, &self.handle);
                if !self.joined.iter().any(|(r, u)| r == &room && u == &user) {
                    self.joined.push((room, user));
                }
            }

            ClientMessage::Leave { room, user } => {
                let Some(pos) = self
                    .joined
                    .iter()
                    .position(|(r, u)| r == &room && u == &user)
                else {
                    warn!(
                        "Session {} sent leave for {} in {} it never joined",
                        self.id(),
                        user,
                        room
                    );
                    return;
                };
                self.joined.remove(pos);
                self.relay.registry().leave(&room, &user, self.id());
            }

            ClientMessage::Offer { to, from, offer } => {
                self.relay.forward(&to, RelayMessage::Offer { from, offer });
            }

            ClientMessage::Answer { to, from, answer } => {
                self.relay.forward(&to, RelayMessage::Answer { from, answer });
            }

            ClientMessage::Candidate {
                to,
                from,
                candidate,
            } => {
                self.relay
                    .forward(&to, RelayMessage::Candidate { from, candidate });
            }
        }
    }

    /// Implicit leave for every room this connection joined. Idempotent.
    pub fn close(&mut self) {
        if self.joined.is_empty() {
            return;
        }
        info!(
            "Session {} disconnected, leaving {} room(s)",
            self.id(),
            self.joined.len()
        );
        for (room, user) in self.joined.drain(..) {
            self.relay.registry().leave(&room, &user, self.handle.id());
        }
    }
}

impl Drop for RelaySession {
    fn drop(&mut self) {
        self.close();
    }
}
