use voicemesh_client::{ConnectionState, Role};
use voicemesh_relay::Relay;

use crate::integration::{init_tracing, start_in_order, wait_member};
use crate::utils::quiet;

#[tokio::test]
async fn test_stale_link_events() {
    init_tracing();

    let relay = Relay::new();
    let peers = start_in_order(&relay, "r1", &["u1", "u2"]).await;
    let (u1, u2) = (&peers[0], &peers[1]);

    assert!(u1.wait_connected(&[("u2", Role::Responder)]).await);
    let old_link = u1.factory.latest("u2").expect("first u1 -> u2");

    u2.session.stop().await;
    assert!(u1.wait_connected(&[]).await);

    u2.session.start().await.expect("restart u2");
    wait_member(&relay, "r1", "u2").await;
    assert!(u1.wait_connected(&[("u2", Role::Responder)]).await);

    let new_link = u1.factory.latest("u2").expect("second u1 -> u2");
    assert_ne!(old_link.link, new_link.link);

    // The torn-down transport reports failure late; the new link must not care.
    old_link.emit_state(ConnectionState::Failed);
    quiet().await;

    assert!(u1.wait_connected(&[("u2", Role::Responder)]).await);
    assert!(!new_link.is_closed());

    u1.session.stop().await;
    u2.session.stop().await;
}
