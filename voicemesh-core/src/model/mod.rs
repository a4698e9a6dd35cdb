mod room;
mod signaling;
mod user;

pub use room::RoomId;
pub use signaling::{
    ClientMessage, IceCandidate, IceServerConfig, RelayMessage, SdpKind, SessionDescription,
};
pub use user::UserId;
