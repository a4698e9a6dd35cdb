use voicemesh_client::Role;
use voicemesh_core::{RelayMessage, UserId};
use voicemesh_relay::Relay;

use crate::integration::{TestPeer, init_tracing, start_in_order, wait_member};

#[tokio::test]
async fn test_user_joined_drops_existing_link() {
    init_tracing();

    let relay = Relay::new();
    let peers = start_in_order(&relay, "r1", &["u1", "u2"]).await;
    let (u1, u2) = (&peers[0], &peers[1]);

    assert!(u1.wait_connected(&[("u2", Role::Responder)]).await);
    let old_link = u1.factory.latest("u2").expect("u1 -> u2");

    relay.forward(
        &UserId::from("u1"),
        RelayMessage::UserJoined {
            room: "r1".into(),
            user: "u2".into(),
        },
    );

    assert!(u1.wait_connected(&[]).await);
    assert!(old_link.is_closed());

    u1.session.stop().await;
    u2.session.stop().await;
}

#[tokio::test]
async fn test_second_session_takes_over_link() {
    init_tracing();

    let relay = Relay::new();
    let peers = start_in_order(&relay, "r1", &["u1", "u2"]).await;
    let (u1, old_u2) = (&peers[0], &peers[1]);

    assert!(u1.wait_connected(&[("u2", Role::Responder)]).await);
    let old_link = u1.factory.latest("u2").expect("first u1 -> u2");

    let new_u2 = TestPeer::new(&relay, "r1", "u2");
    new_u2.session.start().await.expect("start second u2");
    wait_member(&relay, "r1", "u2").await;

    assert!(u1.wait_connected(&[("u2", Role::Responder)]).await);
    assert!(new_u2.wait_connected(&[("u1", Role::Initiator)]).await);
    assert_eq!(u1.factory.created_for("u2"), 2);
    assert!(old_link.is_closed());

    let new_link = u1.factory.latest("u2").expect("second u1 -> u2");
    assert_ne!(old_link.link, new_link.link);

    // The displaced session leaving must not tear down its replacement.
    old_u2.session.stop().await;
    assert!(u1.wait_connected(&[("u2", Role::Responder)]).await);
    assert!(!new_link.is_closed());

    u1.session.stop().await;
    new_u2.session.stop().await;
}
