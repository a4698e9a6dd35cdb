use voicemesh_core::{ClientMessage, SessionDescription};

use crate::integration::{init_tracing, start_test_relay};
use crate::utils::{SILENCE_MS, TestClient};

#[tokio::test]
async fn test_signal_to_unregistered_user_is_dropped() {
    init_tracing();

    let (_relay, url) = start_test_relay().await;

    let mut u1 = TestClient::connect(&url).await.expect("connect u1");
    let mut u2 = TestClient::connect(&url).await.expect("connect u2");
    u1.join("r1", "u1").await.expect("u1 join");
    u2.join("r2", "u2").await.expect("u2 join");

    u1.send(&ClientMessage::Offer {
        to: "nobody".into(),
        from: "u1".into(),
        offer: SessionDescription::offer("v=0"),
    })
    .await
    .expect("send offer");

    // No error back to the sender and nothing delivered anywhere.
    assert!(u1.is_silent_for(SILENCE_MS).await);
    assert!(u2.is_silent_for(SILENCE_MS).await);

    // The connection is still usable afterwards.
    u1.send(&ClientMessage::Offer {
        to: "u2".into(),
        from: "u1".into(),
        offer: SessionDescription::offer("v=0"),
    })
    .await
    .expect("send offer");
    assert!(!u2.is_silent_for(SILENCE_MS).await);

    u1.close().await.expect("close u1");
    u2.close().await.expect("close u2");
}
