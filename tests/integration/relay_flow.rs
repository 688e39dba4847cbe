//! Integration tests for replication across the HTTP relay
//!
//! Tests the flow: coach -> HttpStore (PUT) -> relay -> HttpStore (SSE) -> athlete

use std::sync::Arc;
use std::time::Duration;

use circuit::store::SharedStore;
use circuit::{HttpStore, SessionManager, SessionRecord};

use super::common::{seeded_config, stalled_server, wait_for_view, TestRelay, WAIT};

async fn connect(base_url: &str) -> SessionManager {
    SessionManager::connect(Arc::new(HttpStore::new(base_url)), Duration::from_secs(2)).await
}

#[tokio::test]
async fn test_http_store_probe_and_roundtrip() {
    let relay = TestRelay::start().await;
    let store = HttpStore::new(format!("{}/", relay.base_url));
    store.probe().await.expect("relay is healthy");

    let mut subscription = store.subscribe("sessions/ABC123").await.unwrap();
    store
        .write("sessions/ABC123", serde_json::json!({"currentRound": 4}))
        .await
        .unwrap();

    let received = tokio::time::timeout(WAIT, subscription.next())
        .await
        .expect("snapshot delivered")
        .expect("stream open");
    assert_eq!(received["currentRound"], 4);
    assert_eq!(
        relay.store.read("sessions/ABC123"),
        Some(serde_json::json!({"currentRound": 4}))
    );
}

#[tokio::test]
async fn test_athlete_follows_coach_over_relay() {
    let relay = TestRelay::start().await;
    let coach_side = connect(&relay.base_url).await;
    let athlete_side = connect(&relay.base_url).await;
    assert!(coach_side.is_connected());

    let mut coach = coach_side.create_session(&seeded_config(4, 40, 20));
    let athlete = athlete_side
        .join_session(&coach.code().as_str().to_lowercase())
        .await
        .unwrap()
        .unwrap();
    let mut view = athlete.watch();

    let initial = coach.snapshot();
    let seen = wait_for_view(&mut view, |s| s.same_state(&initial)).await;
    assert_eq!(seen.exercises(), initial.exercises());

    coach.start();
    let seen = wait_for_view(&mut view, |s| s.timer().is_running()).await;
    assert_eq!(seen.timer().round(), 1);

    coach.randomize();
    let expected = coach.snapshot();
    let seen = wait_for_view(&mut view, |s| s.same_state(&expected)).await;
    assert!(!seen.timer().is_running());
    assert_eq!(seen.timer().remaining(), 40);

    coach.close().await;

    let stored = relay
        .store
        .read(&expected.code().store_path())
        .expect("relay holds the session");
    let record = SessionRecord::from_snapshot(stored).unwrap();
    assert_eq!(record.last_update, expected.updated_at().timestamp_millis());

    athlete.leave();
}

#[tokio::test]
async fn test_unreachable_relay_means_local_only() {
    // Grab a free port and release it so nothing is listening there
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let manager = connect(&format!("http://{addr}")).await;
    assert!(!manager.is_connected());
    let coach = manager.create_session(&seeded_config(2, 40, 20));
    assert!(!coach.is_publishing());
}

/// Quitting a coach does not hang on a relay that never answers writes
#[tokio::test]
async fn test_close_is_bounded_by_stalled_relay() {
    let (base_url, server) = stalled_server().await;
    let store = HttpStore::new(base_url).with_write_timeout(Duration::from_millis(200));
    let manager = SessionManager::with_store(Arc::new(store));

    let mut coach = manager.create_session(&seeded_config(2, 40, 20));
    assert!(coach.is_publishing());
    coach.start();

    tokio::time::timeout(WAIT, coach.close())
        .await
        .expect("close returns despite the stalled relay");
    server.abort();
}
