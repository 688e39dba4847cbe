use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::SessionRecord;
use crate::session::{Session, SessionCode};
use crate::store::{SharedStore, Snapshot};

/// How long [`Publisher::close`] waits for queued snapshots to be written
pub const FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

/// Coach-side fan-out of session snapshots.
///
/// [`Publisher::publish`] never waits on the store. Snapshots go through one
/// writer task, so they reach the store in commit order; when the store is
/// slower than the coach, queued snapshots collapse to the newest one.
pub struct Publisher {
    path: String,
    tx: mpsc::UnboundedSender<Snapshot>,
    writer: JoinHandle<()>,
}

impl Publisher {
    /// Start the writer task. Must be called from within a Tokio runtime.
    pub fn spawn(store: Arc<dyn SharedStore>, code: &SessionCode) -> Self {
        let path = code.store_path();
        let (tx, mut rx) = mpsc::unbounded_channel::<Snapshot>();

        let writer_path = path.clone();
        let writer = tokio::spawn(async move {
            while let Some(mut snapshot) = rx.recv().await {
                while let Ok(newer) = rx.try_recv() {
                    snapshot = newer;
                }
                if let Err(err) = store.write(&writer_path, snapshot).await {
                    tracing::warn!(
                        path = %writer_path,
                        store = store.name(),
                        error = %err,
                        "Failed to publish session snapshot"
                    );
                }
            }
            tracing::debug!(path = %writer_path, "Publisher stopped");
        });

        Self { path, tx, writer }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Queue a full snapshot of `session` for writing
    pub fn publish(&self, session: &Session) {
        let snapshot = match SessionRecord::from(session).to_snapshot() {
            Ok(snapshot) => snapshot,
            Err(err) => {
                tracing::error!(path = %self.path, error = %err, "Failed to serialize snapshot");
                return;
            }
        };

        if self.tx.send(snapshot).is_err() {
            tracing::debug!(path = %self.path, "Publisher closed; snapshot dropped");
        }
    }

    /// Flush queued snapshots and stop the writer.
    ///
    /// Gives up after [`FLUSH_TIMEOUT`]; whatever the store has not accepted
    /// by then is dropped.
    pub async fn close(self) {
        let Self { path, tx, mut writer } = self;
        drop(tx);
        match tokio::time::timeout(FLUSH_TIMEOUT, &mut writer).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                tracing::debug!(%path, error = %err, "Publisher task ended abnormally");
            }
            Err(_) => {
                tracing::warn!(%path, "Store stalled; dropping unwritten snapshots");
                writer.abort();
            }
        }
    }
}
