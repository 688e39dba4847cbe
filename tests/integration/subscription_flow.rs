//! Integration tests for HTTP subscription reconnects
//!
//! Each test points an HttpStore at a raw TCP server that refuses, fails or
//! closes the event stream.

use std::time::Duration;

use circuit::store::{RetryConfig, SharedStore};
use circuit::HttpStore;

use super::common::{refused_addr, scripted_server, sse_response, status_response, WAIT};

fn fast_retry(max_retries: usize) -> RetryConfig {
    RetryConfig {
        initial_delay: Duration::from_millis(10),
        factor: 2.0,
        max_delay: Duration::from_millis(50),
        max_retries,
    }
}

/// A relay that never comes back ends the subscription after the retries
#[tokio::test]
async fn test_subscription_gives_up_on_refused_relay() {
    let store = HttpStore::new(refused_addr().await).with_retry(fast_retry(3));
    let mut subscription = store.subscribe("sessions/ABC123").await.unwrap();

    let next = tokio::time::timeout(WAIT, subscription.next())
        .await
        .expect("subscription ends instead of retrying forever");
    assert!(next.is_none());
}

/// Every successful open starts the retry count over
#[tokio::test]
async fn test_subscription_reconnects_after_each_close() {
    let (base_url, server) =
        scripted_server(|n| sse_response(&format!("{{\"n\":{}}}", n + 1))).await;
    let store = HttpStore::new(base_url).with_retry(fast_retry(1));
    let mut subscription = store.subscribe("sessions/ABC123").await.unwrap();

    for expected in 1..=3 {
        let snapshot = tokio::time::timeout(WAIT, subscription.next())
            .await
            .expect("snapshot after reconnect")
            .expect("subscription still open");
        assert_eq!(snapshot["n"], expected);
    }

    drop(subscription);
    server.abort();
}

/// An error status from a proxy in front of the relay is retried
#[tokio::test]
async fn test_subscription_retries_error_status() {
    let (base_url, server) = scripted_server(|n| match n {
        0 => status_response("502 Bad Gateway"),
        1 => status_response("503 Service Unavailable"),
        _ => sse_response("{\"n\":1}"),
    })
    .await;
    let store = HttpStore::new(base_url).with_retry(fast_retry(3));
    let mut subscription = store.subscribe("sessions/ABC123").await.unwrap();

    let snapshot = tokio::time::timeout(WAIT, subscription.next())
        .await
        .expect("snapshot after the relay recovers")
        .expect("subscription still open");
    assert_eq!(snapshot["n"], 1);

    drop(subscription);
    server.abort();
}
