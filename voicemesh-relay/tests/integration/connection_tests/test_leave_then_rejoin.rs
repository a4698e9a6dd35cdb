use voicemesh_core::UserId;

use crate::integration::{init_tracing, start_test_relay};
use crate::utils::{SIGNAL_TIMEOUT_MS, SILENCE_MS, TestClient, is_user_joined, is_user_left};

#[tokio::test]
async fn test_leave_then_rejoin_looks_like_fresh_join() {
    init_tracing();

    let (relay, url) = start_test_relay().await;

    let mut host = TestClient::connect(&url).await.expect("connect host");
    host.join("r1", "host").await.expect("host join");

    let mut first = TestClient::connect(&url).await.expect("connect first");
    let roster = first.join("r1", "guest").await.expect("first join");
    assert_eq!(roster, vec![UserId::from("host")]);
    let msg = host.recv(SIGNAL_TIMEOUT_MS).await.expect("joined");
    assert!(is_user_joined(&msg, "guest"));

    first.leave("r1", "guest").await.expect("leave");
    let msg = host.recv(SIGNAL_TIMEOUT_MS).await.expect("left");
    assert!(is_user_left(&msg, "guest"));

    let mut second = TestClient::connect(&url).await.expect("connect second");
    let roster = second.join("r1", "guest").await.expect("second join");
    assert_eq!(roster, vec![UserId::from("host")], "No stale roster carry-over");
    let msg = host.recv(SIGNAL_TIMEOUT_MS).await.expect("joined again");
    assert!(is_user_joined(&msg, "guest"));

    // The old connection going away must not evict the new registration.
    first.close().await.expect("close first");
    assert!(host.is_silent_for(SILENCE_MS).await);
    assert!(relay.registry().is_registered(&UserId::from("guest")));
    assert_eq!(relay.registry().members(&"r1".into()).len(), 2);

    host.close().await.expect("close host");
    second.close().await.expect("close second");
}
