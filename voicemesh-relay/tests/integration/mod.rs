//! Integration tests for voicemesh-relay over real WebSocket connections.
//!
//! - `connection_tests` - join, leave and disconnect bookkeeping
//! - `messaging_tests` - addressed offer/answer/candidate forwarding
//! - `multi_peer_tests` - roster ordering with several members

pub mod connection_tests;

use tracing::Level;

use voicemesh_relay::{Relay, RelayConfig, router};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Serve a fresh relay on an ephemeral port.
///
/// Returns the relay (for registry inspection) and the WebSocket url.
pub async fn start_test_relay() -> (Relay, String) {
    let relay = Relay::new();
    let config = RelayConfig::default();
    let app = router(relay.clone(), &config);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("No local addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Relay server failed");
    });

    (relay, format!("ws://{}{}", addr, config.path))
}
