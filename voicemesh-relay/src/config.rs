use std::net::SocketAddr;
use voicemesh_core::utils::DEFAULT_RELAY_PATH;

/// Where and how the relay listens.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub bind: SocketAddr,
    /// Route that upgrades to the signaling WebSocket.
    pub path: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 3000)),
            path: DEFAULT_RELAY_PATH.to_owned(),
        }
    }
}
