use voicemesh_core::UserId;

use crate::integration::{init_tracing, start_test_relay};
use crate::utils::{SILENCE_MS, TestClient};

#[tokio::test]
async fn test_malformed_frames_are_ignored() {
    init_tracing();

    let (_relay, url) = start_test_relay().await;

    let mut u1 = TestClient::connect(&url).await.expect("connect u1");
    u1.join("r1", "u1").await.expect("u1 join");

    u1.send_raw("not json at all").await.expect("send garbage");
    u1.send_raw(r#"{"op":"teleport","d":{}}"#)
        .await
        .expect("send unknown op");
    u1.send_raw(r#"{"op":"offer","d":{"to":"u2"}}"#)
        .await
        .expect("send truncated offer");
    assert!(u1.is_silent_for(SILENCE_MS).await);

    // The relay survived and still serves the room.
    let mut u2 = TestClient::connect(&url).await.expect("connect u2");
    let roster = u2.join("r1", "u2").await.expect("u2 join");
    assert_eq!(roster, vec![UserId::from("u1")]);

    u1.close().await.expect("close u1");
    u2.close().await.expect("close u2");
}
