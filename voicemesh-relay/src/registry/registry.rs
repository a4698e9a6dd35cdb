use crate::registry::session_handle::{SessionHandle, SessionId};
use dashmap::DashMap;
use tracing::{debug, info, warn};
use voicemesh_core::{RelayMessage, RoomId, UserId};

#[derive(Debug, Clone)]
struct Member {
    user: UserId,
    session: SessionId,
}

/// Room membership and user -> session routing for one relay process.
///
/// Single writer per key: an entry is only ever created or removed on behalf of
/// the session that owns it. Every mutation that is keyed by another session's
/// id is a no-op, so a stale connection can never evict a newer one that
/// registered the same user id.
///
/// Lock order is always `rooms` before `sessions`.
#[derive(Default)]
pub struct Registry {
    sessions: DashMap<UserId, SessionHandle>,
    rooms: DashMap<RoomId, Vec<Member>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `user` in `room` and returns the other members in join order.
    ///
    /// The roster is queued to `session` and `user-joined` is queued to every
    /// other member while the room entry is held, so a concurrent joiner's
    /// announcement can only ever land behind this roster.
    pub fn join(&self, room: &RoomId, user: &UserId, session: &SessionHandle) -> Vec<UserId> {
        let mut members = self.rooms.entry(room.clone()).or_default();

        if let Some(previous) = self.sessions.insert(user.clone(), session.clone()) {
            if previous.id() != session.id() {
                warn!(
                    "User {} re-registered by session {} (was {})",
                    user,
                    session.id(),
                    previous.id()
                );
            }
        }

        let roster: Vec<UserId> = members
            .iter()
            .filter(|m| &m.user != user)
            .map(|m| m.user.clone())
            .collect();

        // A membership taken over from another session counts as that
        // session leaving, so peers drop whatever they had with it.
        let displaced = match members.iter_mut().find(|m| &m.user == user) {
            Some(existing) => {
                let displaced = existing.session != session.id();
                existing.session = session.id();
                displaced
            }
            None => {
                members.push(Member {
                    user: user.clone(),
                    session: session.id(),
                });
                false
            }
        };

        session.send(RelayMessage::Users {
            room: room.clone(),
            users: roster.clone(),
        });

        for peer in &roster {
            let Some(handle) = self.sessions.get(peer) else {
                continue;
            };
            if displaced {
                handle.send(RelayMessage::UserLeft {
                    room: room.clone(),
                    user: user.clone(),
                });
            }
            handle.send(RelayMessage::UserJoined {
                room: room.clone(),
                user: user.clone(),
            });
        }

        info!("{} joined {} ({} other members)", user, room, roster.len());
        roster
    }

    /// Removes `user` from `room` if `session` owns that membership and
    /// announces `user-left` to the remaining members.
    ///
    /// Returns whether anything was removed.
    pub fn leave(&self, room: &RoomId, user: &UserId, session: SessionId) -> bool {
        let removed = match self.rooms.get_mut(room) {
            Some(mut members) => {
                let before = members.len();
                members.retain(|m| !(&m.user == user && m.session == session));
                let removed = members.len() != before;

                if removed {
                    for member in members.iter() {
                        let Some(handle) = self.sessions.get(&member.user) else {
                            continue;
                        };
                        handle.send(RelayMessage::UserLeft {
                            room: room.clone(),
                            user: user.clone(),
                        });
                    }
                }
                removed
            }
            None => false,
        };

        if self.rooms.remove_if(room, |_, members| members.is_empty()).is_some() {
            debug!("Room {} is empty, dropping it", room);
        }

        if removed {
            self.release_user(user, session);
            info!("{} left {}", user, room);
        }

        removed
    }

    /// Drops the `user -> session` mapping unless the user is still a member
    /// of another room through the same session.
    fn release_user(&self, user: &UserId, session: SessionId) {
        let still_member = self.rooms.iter().any(|entry| {
            entry
                .value()
                .iter()
                .any(|m| &m.user == user && m.session == session)
        });

        if !still_member {
            self.sessions
                .remove_if(user, |_, handle| handle.id() == session);
        }
    }

    pub fn lookup(&self, user: &UserId) -> Option<SessionHandle> {
        self.sessions.get(user).map(|entry| entry.value().clone())
    }

    pub fn members(&self, room: &RoomId) -> Vec<UserId> {
        self.rooms
            .get(room)
            .map(|members| members.iter().map(|m| m.user.clone()).collect())
            .unwrap_or_default()
    }

    pub fn is_registered(&self, user: &UserId) -> bool {
        self.sessions.contains_key(user)
    }
}
