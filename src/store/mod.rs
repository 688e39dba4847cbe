//! Shared key-value store used to replicate sessions between clients
//!
//! The store is an opaque publish/subscribe map keyed by path. Two backends
//! are provided:
//! - [`MemoryStore`]: in-process, also backs the relay server
//! - [`HttpStore`]: talks to a relay over HTTP, subscriptions via SSE

mod error;
mod http;
mod memory;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

pub use error::StoreError;
pub use http::{HttpStore, RetryConfig, DEFAULT_WRITE_TIMEOUT};
pub use memory::MemoryStore;

/// Opaque JSON document stored at a path
pub type Snapshot = serde_json::Value;

/// Buffered snapshots per subscription before the producer waits
const SUBSCRIPTION_BUFFER: usize = 64;

/// Store path for a session code (`sessions/{code}`)
pub fn session_path(code: &str) -> String {
    format!("sessions/{code}")
}

/// Publish/subscribe store keyed by path
#[async_trait]
pub trait SharedStore: Send + Sync {
    /// Short backend name for logs
    fn name(&self) -> &'static str;

    /// Check that the store is reachable
    async fn probe(&self) -> Result<(), StoreError>;

    /// Replace the document at `path`
    async fn write(&self, path: &str, snapshot: Snapshot) -> Result<(), StoreError>;

    /// Watch `path`. The current document, if any, is delivered first.
    async fn subscribe(&self, path: &str) -> Result<Subscription, StoreError>;
}

/// Receiving end of a store subscription.
///
/// Dropping it (or calling [`Subscription::unsubscribe`]) tells the backend
/// to stop forwarding.
pub struct Subscription {
    path: String,
    rx: mpsc::Receiver<Snapshot>,
    cancel: CancellationToken,
}

/// Backend side of a subscription
pub struct SubscriptionFeed {
    tx: mpsc::Sender<Snapshot>,
    cancel: CancellationToken,
}

impl Subscription {
    /// Create a connected feed/subscription pair
    pub fn channel(path: impl Into<String>) -> (SubscriptionFeed, Subscription) {
        let (tx, rx) = mpsc::channel(SUBSCRIPTION_BUFFER);
        let cancel = CancellationToken::new();
        (
            SubscriptionFeed {
                tx,
                cancel: cancel.clone(),
            },
            Subscription {
                path: path.into(),
                rx,
                cancel,
            },
        )
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Wait for the next snapshot. `None` once the backend gives up.
    pub async fn next(&mut self) -> Option<Snapshot> {
        self.rx.recv().await
    }

    pub fn unsubscribe(self) {
        tracing::debug!(path = %self.path, "Unsubscribing");
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl SubscriptionFeed {
    /// Forward a snapshot. Returns false once the subscriber is gone.
    pub async fn send(&self, snapshot: Snapshot) -> bool {
        if self.cancel.is_cancelled() {
            return false;
        }
        self.tx.send(snapshot).await.is_ok()
    }

    /// Resolves when the subscriber unsubscribes
    pub async fn cancelled(&self) {
        self.cancel.cancelled().await
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled() || self.tx.is_closed()
    }
}
