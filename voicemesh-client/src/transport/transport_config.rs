use voicemesh_core::IceServerConfig;
use voicemesh_core::utils::DEFAULT_STUN_ADDR;

/// ICE configuration handed to every peer connection.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub ice_servers: Vec<IceServerConfig>,
}

impl TransportConfig {
    /// Host candidates only. Enough for peers on the same machine or LAN.
    pub fn local_only() -> Self {
        Self {
            ice_servers: Vec::new(),
        }
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            ice_servers: vec![IceServerConfig::stun(DEFAULT_STUN_ADDR)],
        }
    }
}
