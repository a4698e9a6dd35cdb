pub use voicemesh_core::model::{RoomId, UserId};

pub mod model {
    pub use voicemesh_core::model::*;
}

#[cfg(feature = "relay")]
pub mod relay {
    pub use voicemesh_relay::*;
}

#[cfg(feature = "client")]
pub mod client {
    pub use voicemesh_client::*;
}
