use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::SessionRecord;
use crate::session::{Session, SessionCode};
use crate::store::{SharedStore, Snapshot, StoreError};

/// Which inbound snapshots an athlete applies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ReplicationOrdering {
    /// Apply every snapshot in arrival order; a late, older snapshot rolls
    /// the view back
    Arrival,
    /// Apply a snapshot only if its `lastUpdate` is newer than the last one
    /// applied
    #[default]
    Newest,
}

impl ReplicationOrdering {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReplicationOrdering::Arrival => "arrival",
            ReplicationOrdering::Newest => "newest",
        }
    }
}

/// Result of offering a snapshot to a [`Replica`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// Older than (or as old as) what is already shown
    Stale,
    /// Not a valid session record
    Rejected,
}

/// Athlete-side copy of a session, fed one snapshot at a time
#[derive(Debug, Clone)]
pub struct Replica {
    code: SessionCode,
    ordering: ReplicationOrdering,
    last_applied: Option<i64>,
    view: Option<Session>,
}

impl Replica {
    pub fn new(code: SessionCode, ordering: ReplicationOrdering) -> Self {
        Self {
            code,
            ordering,
            last_applied: None,
            view: None,
        }
    }

    pub fn view(&self) -> Option<&Session> {
        self.view.as_ref()
    }

    pub fn apply(&mut self, snapshot: Snapshot) -> ApplyOutcome {
        let record = match SessionRecord::from_snapshot(snapshot) {
            Ok(record) => record,
            Err(err) => {
                tracing::warn!(code = %self.code, error = %err, "Ignoring malformed snapshot");
                return ApplyOutcome::Rejected;
            }
        };

        let stamp = record.last_update;
        if self.ordering == ReplicationOrdering::Newest
            && self.last_applied.is_some_and(|last| stamp <= last)
        {
            tracing::debug!(code = %self.code, stamp, "Skipping stale snapshot");
            return ApplyOutcome::Stale;
        }

        match record.into_session(self.code.clone()) {
            Ok(session) => {
                self.view = Some(session);
                self.last_applied = Some(stamp);
                ApplyOutcome::Applied
            }
            Err(err) => {
                tracing::warn!(code = %self.code, error = %err, "Ignoring invalid snapshot");
                ApplyOutcome::Rejected
            }
        }
    }
}

/// Long-lived subscription that keeps a [`Replica`] current.
///
/// The subscription is released on [`Mirror::stop`] or when dropped.
pub struct Mirror {
    code: SessionCode,
    view_rx: watch::Receiver<Option<Session>>,
    task: JoinHandle<()>,
}

impl Mirror {
    pub async fn start(
        store: Arc<dyn SharedStore>,
        code: SessionCode,
        ordering: ReplicationOrdering,
    ) -> Result<Self, StoreError> {
        let mut subscription = store.subscribe(&code.store_path()).await?;
        let (view_tx, view_rx) = watch::channel(None);

        let mut replica = Replica::new(code.clone(), ordering);
        let task = tokio::spawn(async move {
            while let Some(snapshot) = subscription.next().await {
                if replica.apply(snapshot) == ApplyOutcome::Applied {
                    view_tx.send_replace(replica.view().cloned());
                }
            }
            tracing::debug!(path = %subscription.path(), "Mirror subscription ended");
        });

        tracing::info!(%code, ordering = ordering.as_str(), store = store.name(), "Mirroring session");

        Ok(Self {
            code,
            view_rx,
            task,
        })
    }

    pub fn code(&self) -> &SessionCode {
        &self.code
    }

    /// Latest applied session, if any snapshot has arrived yet
    pub fn view(&self) -> Option<Session> {
        self.view_rx.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<Option<Session>> {
        self.view_rx.clone()
    }

    pub fn is_active(&self) -> bool {
        !self.task.is_finished()
    }

    pub fn stop(self) {
        tracing::debug!(code = %self.code, "Stopping mirror");
    }
}

impl Drop for Mirror {
    fn drop(&mut self) {
        self.task.abort();
    }
}
