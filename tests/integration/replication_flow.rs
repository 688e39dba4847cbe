//! Integration tests for coach -> store -> athlete replication
//!
//! Everything runs in-process over a MemoryStore.

use std::sync::Arc;
use std::time::Duration;

use circuit::store::SharedStore;
use circuit::{MemoryStore, Phase, ReplicationOrdering, SessionManager, SessionRecord};

use super::common::{seeded_config, wait_for_view, WAIT};

fn manager(store: &MemoryStore) -> SessionManager {
    SessionManager::with_store(Arc::new(store.clone()))
}

/// Athlete mirrors the coach through a full work/rest cycle
#[tokio::test(start_paused = true)]
async fn test_athlete_follows_coach_cycle() {
    let store = MemoryStore::new();
    let manager = manager(&store);

    let mut coach = manager.create_session(&seeded_config(3, 40, 20));
    let code = coach.code();
    let input = format!("  {}  ", code.as_str().to_lowercase());
    let athlete = manager
        .join_session(&input)
        .await
        .expect("join succeeds")
        .expect("code is not blank");
    assert_eq!(athlete.code(), &code);

    let mut view = athlete.watch();
    let initial = coach.snapshot();
    let seen = wait_for_view(&mut view, |s| s.same_state(&initial)).await;
    assert_eq!(seen.exercises().len(), 3);

    coach.start();
    tokio::time::sleep(Duration::from_millis(40_500)).await;
    let seen = wait_for_view(&mut view, |s| s.timer().phase() == Phase::Rest).await;
    assert_eq!(seen.timer().remaining(), 20);
    assert_eq!(seen.timer().round(), 1);

    tokio::time::sleep(Duration::from_secs(20)).await;
    let seen = wait_for_view(&mut view, |s| s.timer().round() == 2).await;
    assert_eq!(seen.timer().phase(), Phase::Work);
    assert_eq!(seen.timer().remaining(), 40);

    coach.pause();
    let seen = wait_for_view(&mut view, |s| !s.timer().is_running()).await;
    assert!(seen.same_state(&coach.snapshot()));

    athlete.leave();
    coach.close().await;
}

/// Shuffling and reconfiguring are mirrored and always reset the timer
#[tokio::test]
async fn test_reconfiguration_reaches_every_athlete() {
    let store = MemoryStore::new();
    let manager = manager(&store);
    let mut coach = manager.create_session(&seeded_config(2, 40, 20));
    let code = coach.code();

    let first = manager.join_session(code.as_str()).await.unwrap().unwrap();
    let second = manager.join_session(code.as_str()).await.unwrap().unwrap();

    coach.set_participants(5).unwrap();
    coach.set_durations(30, 15).unwrap();
    let expected = coach.snapshot();

    for athlete in [&first, &second] {
        let mut view = athlete.watch();
        let seen = wait_for_view(&mut view, |s| s.same_state(&expected)).await;
        assert_eq!(seen.participants(), 5);
        assert_eq!(seen.exercises().len(), 5);
        assert_eq!(seen.timer().remaining(), 30);
        assert!(!seen.timer().is_running());
    }

    first.leave();
    second.leave();
    coach.close().await;
}

/// A delayed, older snapshot rolls back an arrival-ordered athlete but not
/// a newest-ordered one
#[tokio::test]
async fn test_out_of_order_snapshot_by_ordering() {
    let store = MemoryStore::new();
    let mut coach = manager(&store).create_session(&seeded_config(2, 1, 1));
    let code = coach.code();
    let path = code.store_path();

    let arrival = manager(&store)
        .with_ordering(ReplicationOrdering::Arrival)
        .join_session(code.as_str())
        .await
        .unwrap()
        .unwrap();
    let newest = manager(&store)
        .with_ordering(ReplicationOrdering::Newest)
        .join_session(code.as_str())
        .await
        .unwrap()
        .unwrap();

    // Round 1 snapshot, held back to simulate a slow delivery
    let round_one = SessionRecord::from(&coach.snapshot());

    coach.start();
    tokio::time::timeout(WAIT, async {
        let mut rx = coach.watch();
        rx.wait_for(|s| s.timer().round() == 2).await.unwrap();
    })
    .await
    .expect("coach reaches round 2");
    coach.pause();
    let round_two = coach.snapshot();

    let mut arrival_view = arrival.watch();
    let mut newest_view = newest.watch();
    wait_for_view(&mut arrival_view, |s| s.same_state(&round_two)).await;
    wait_for_view(&mut newest_view, |s| s.same_state(&round_two)).await;

    store
        .write(&path, round_one.to_snapshot().unwrap())
        .await
        .unwrap();

    let seen = wait_for_view(&mut arrival_view, |s| s.timer().round() == 1).await;
    assert_eq!(seen.timer().phase(), Phase::Work);

    // Give the newest-ordered mirror the same chance to apply it
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(newest.view().unwrap().timer().round(), 2);

    arrival.leave();
    newest.leave();
    coach.close().await;
}

/// Without a reachable store the coach runs locally and athletes see nothing
#[tokio::test]
async fn test_local_only_mode() {
    let manager =
        SessionManager::connect(Arc::new(MemoryStore::offline()), Duration::from_millis(200)).await;
    assert!(!manager.is_connected());

    let mut coach = manager.create_session(&seeded_config(2, 40, 20));
    assert!(!coach.is_publishing());
    assert!(coach.start());

    let athlete = manager.join_session(coach.code().as_str()).await.unwrap().unwrap();
    assert!(!athlete.is_mirroring());
    assert!(athlete.view().is_none());

    assert!(manager.join_session("").await.unwrap().is_none());
    coach.close().await;
}

/// Leaving releases the athlete's subscription in the store
#[tokio::test]
async fn test_leave_releases_subscription() {
    let store = MemoryStore::new();
    let manager = manager(&store);
    let coach = manager.create_session(&seeded_config(1, 40, 20));
    let athlete = manager.join_session(coach.code().as_str()).await.unwrap().unwrap();
    coach.close().await;

    assert!(store.purge_idle(Duration::ZERO).is_empty());
    athlete.leave();

    tokio::time::timeout(WAIT, async {
        while store.purge_idle(Duration::ZERO).is_empty() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("subscription released after leave");
}
