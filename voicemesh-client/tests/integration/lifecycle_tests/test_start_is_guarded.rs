use voicemesh_core::{RoomId, UserId};
use voicemesh_relay::Relay;

use crate::integration::{TestPeer, init_tracing, wait_gone, wait_member};

#[tokio::test]
async fn test_start_twice_is_a_noop() {
    init_tracing();

    let relay = Relay::new();
    let u1 = TestPeer::new(&relay, "r1", "u1");

    u1.session.start().await.expect("first start");
    u1.session.start().await.expect("second start");
    wait_member(&relay, "r1", "u1").await;

    assert!(u1.session.is_started());
    assert_eq!(u1.capture.acquired(), 1);
    assert_eq!(
        relay.registry().members(&RoomId::from("r1")),
        vec![UserId::from("u1")]
    );

    u1.session.stop().await;
}

#[tokio::test]
async fn test_concurrent_start_acquires_once() {
    init_tracing();

    let relay = Relay::new();
    let u1 = TestPeer::new(&relay, "r1", "u1");

    let (first, second) = tokio::join!(u1.session.start(), u1.session.start());
    assert!(first.is_ok());
    assert!(second.is_ok());

    assert_eq!(u1.capture.acquired(), 1);
    assert!(u1.session.is_started());

    u1.session.stop().await;
}

#[tokio::test]
async fn test_start_waiting_on_stop_ends_up_started() {
    init_tracing();

    let relay = Relay::new();
    let u1 = TestPeer::new(&relay, "r1", "u1");
    u1.session.start().await.expect("first start");
    wait_member(&relay, "r1", "u1").await;
    let first_audio = u1.capture.last().expect("first capture");

    // stop takes the session lock first; start queues behind it.
    let ((), restarted) = tokio::join!(u1.session.stop(), u1.session.start());
    assert!(restarted.is_ok());

    assert!(u1.session.is_started());
    assert!(u1.session.peers().await.is_ok());
    assert_eq!(u1.capture.acquired(), 2);
    assert_eq!(first_audio.release_count(), 1);
    wait_member(&relay, "r1", "u1").await;

    u1.session.stop().await;
    assert!(!u1.session.is_started());
    assert!(u1.session.peers().await.is_err());
    assert_eq!(u1.capture.last().expect("second capture").release_count(), 1);
    wait_gone(&relay, "r1", "u1").await;
}

#[tokio::test]
async fn test_stop_racing_first_start_is_consistent() {
    init_tracing();

    let relay = Relay::new();
    let u1 = TestPeer::new(&relay, "r1", "u1");

    let (started, ()) = tokio::join!(u1.session.start(), u1.session.stop());
    assert!(started.is_ok());

    // Whichever call won, the flag and the engine agree.
    let running = u1.session.peers().await.is_ok();
    assert_eq!(u1.session.is_started(), running);
    assert_eq!(u1.capture.acquired(), 1);
    if !running {
        assert_eq!(u1.capture.last().expect("u1 capture").release_count(), 1);
    }

    u1.session.stop().await;
    assert!(!u1.session.is_started());
    assert_eq!(u1.capture.last().expect("u1 capture").release_count(), 1);
    wait_gone(&relay, "r1", "u1").await;
}

#[tokio::test]
async fn test_stop_before_start_is_a_noop() {
    init_tracing();

    let relay = Relay::new();
    let u1 = TestPeer::new(&relay, "r1", "u1");

    u1.session.stop().await;

    assert!(!u1.session.is_started());
    assert!(u1.session.is_muted());
    assert_eq!(u1.capture.acquired(), 0);
}
