use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::time::Instant;

use super::{SharedStore, Snapshot, StoreError, Subscription};

/// Fan-out capacity per path; slower subscribers skip to newer snapshots
const SLOT_CAPACITY: usize = 32;

struct Slot {
    latest: Option<Snapshot>,
    touched: Instant,
    tx: broadcast::Sender<Snapshot>,
}

impl Slot {
    fn new() -> Self {
        let (tx, _) = broadcast::channel(SLOT_CAPACITY);
        Self {
            latest: None,
            touched: Instant::now(),
            tx,
        }
    }
}

/// In-process shared store.
///
/// Cloning yields another handle onto the same map, so several in-process
/// clients can share sessions and the relay can serve it over HTTP.
#[derive(Clone)]
pub struct MemoryStore {
    slots: Arc<Mutex<HashMap<String, Slot>>>,
    offline: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            slots: Arc::new(Mutex::new(HashMap::new())),
            offline: false,
        }
    }

    /// A store that fails every call, for exercising local-only mode
    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::new()
        }
    }

    /// Latest document at `path`
    pub fn read(&self, path: &str) -> Option<Snapshot> {
        self.slots.lock().get(path).and_then(|slot| slot.latest.clone())
    }

    /// All paths that currently hold a document or a subscriber
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.slots.lock().keys().cloned().collect();
        paths.sort();
        paths
    }

    /// Drop paths nobody has written for `ttl` and nobody is watching.
    /// Returns the removed paths.
    pub fn purge_idle(&self, ttl: Duration) -> Vec<String> {
        let mut slots = self.slots.lock();
        let expired: Vec<String> = slots
            .iter()
            .filter(|(_, slot)| slot.tx.receiver_count() == 0 && slot.touched.elapsed() >= ttl)
            .map(|(path, _)| path.clone())
            .collect();
        for path in &expired {
            slots.remove(path);
        }
        expired
    }

    fn ensure_online(&self) -> Result<(), StoreError> {
        if self.offline {
            return Err(StoreError::Unavailable("memory store is offline".to_string()));
        }
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SharedStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn probe(&self) -> Result<(), StoreError> {
        self.ensure_online()
    }

    async fn write(&self, path: &str, snapshot: Snapshot) -> Result<(), StoreError> {
        self.ensure_online()?;

        let mut slots = self.slots.lock();
        let slot = slots.entry(path.to_string()).or_insert_with(Slot::new);
        slot.latest = Some(snapshot.clone());
        slot.touched = Instant::now();
        // No receivers is fine; the snapshot is kept as `latest`.
        let _ = slot.tx.send(snapshot);
        Ok(())
    }

    async fn subscribe(&self, path: &str) -> Result<Subscription, StoreError> {
        self.ensure_online()?;

        let (mut rx, latest) = {
            let mut slots = self.slots.lock();
            let slot = slots.entry(path.to_string()).or_insert_with(Slot::new);
            (slot.tx.subscribe(), slot.latest.clone())
        };

        let (feed, subscription) = Subscription::channel(path);
        let path = path.to_string();

        tokio::spawn(async move {
            if let Some(initial) = latest {
                if !feed.send(initial).await {
                    return;
                }
            }

            loop {
                let received = tokio::select! {
                    _ = feed.cancelled() => break,
                    received = rx.recv() => received,
                };

                match received {
                    Ok(snapshot) => {
                        if !feed.send(snapshot).await {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(%path, skipped, "Subscriber lagged behind; skipped snapshots");
                    }
                    Err(RecvError::Closed) => break,
                }
            }

            tracing::debug!(%path, "Memory subscription closed");
        });

        Ok(subscription)
    }
}
