use crate::transport::TransportConfig;
use voicemesh_core::utils::DEFAULT_STUN_ADDR;
use voicemesh_core::{IceServerConfig, RoomId, UserId};

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// WebSocket URL of the relay, e.g. `ws://127.0.0.1:3000/voice`.
    pub relay_url: String,
    pub room: RoomId,
    pub user: UserId,
    pub ice_servers: Vec<IceServerConfig>,
}

impl ClientConfig {
    pub fn new(relay_url: impl Into<String>, room: impl Into<RoomId>, user: impl Into<UserId>) -> Self {
        Self {
            relay_url: relay_url.into(),
            room: room.into(),
            user: user.into(),
            ice_servers: vec![IceServerConfig::stun(DEFAULT_STUN_ADDR)],
        }
    }

    pub fn with_ice_servers(mut self, ice_servers: Vec<IceServerConfig>) -> Self {
        self.ice_servers = ice_servers;
        self
    }

    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig {
            ice_servers: self.ice_servers.clone(),
        }
    }
}
