use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::{AthleteSession, CoachSession, Role, Session, SessionCode, SessionConfig, SessionError};
use crate::store::SharedStore;
use crate::sync::{Mirror, Publisher, ReplicationOrdering};

/// Creates and joins sessions against an optional shared store.
///
/// Without a store every session is local: coaches publish nothing and
/// athletes see nothing.
pub struct SessionManager {
    store: Option<Arc<dyn SharedStore>>,
    ordering: ReplicationOrdering,
}

impl SessionManager {
    pub fn local_only() -> Self {
        Self {
            store: None,
            ordering: ReplicationOrdering::default(),
        }
    }

    /// Use `store` without probing it
    pub fn with_store(store: Arc<dyn SharedStore>) -> Self {
        Self {
            store: Some(store),
            ordering: ReplicationOrdering::default(),
        }
    }

    /// Probe `store` once. An unreachable or slow store leaves the manager
    /// local-only; there is no retry.
    pub async fn connect(store: Arc<dyn SharedStore>, probe_timeout: Duration) -> Self {
        match tokio::time::timeout(probe_timeout, store.probe()).await {
            Ok(Ok(())) => {
                tracing::info!(store = store.name(), "Shared store available");
                Self::with_store(store)
            }
            Ok(Err(err)) => {
                tracing::warn!(store = store.name(), error = %err, "Shared store unavailable; running local-only");
                Self::local_only()
            }
            Err(_) => {
                tracing::warn!(
                    store = store.name(),
                    timeout_ms = probe_timeout.as_millis() as u64,
                    "Shared store probe timed out; running local-only"
                );
                Self::local_only()
            }
        }
    }

    pub fn with_ordering(mut self, ordering: ReplicationOrdering) -> Self {
        self.ordering = ordering;
        self
    }

    pub fn ordering(&self) -> ReplicationOrdering {
        self.ordering
    }

    /// Status indicator: whether sessions are shared
    pub fn is_connected(&self) -> bool {
        self.store.is_some()
    }

    /// Unconnected timer that never touches the store
    pub fn standalone(&self, config: &SessionConfig) -> CoachSession {
        let code = SessionCode::generate();
        CoachSession::new(
            Role::Solo,
            Session::new(code, config.participants, config.durations),
            None,
            rng_for(config),
        )
    }

    /// Start a new session as its coach.
    ///
    /// Publishing starts immediately when a store is connected, which
    /// requires a Tokio runtime.
    pub fn create_session(&self, config: &SessionConfig) -> CoachSession {
        let code = SessionCode::generate();
        let publisher = self
            .store
            .as_ref()
            .map(|store| Publisher::spawn(Arc::clone(store), &code));

        tracing::info!(%code, publishing = publisher.is_some(), "Created session");
        CoachSession::new(
            Role::Coach,
            Session::new(code, config.participants, config.durations),
            publisher,
            rng_for(config),
        )
    }

    /// Follow the session named by `input`.
    ///
    /// Blank input is a no-op and returns `Ok(None)`.
    pub async fn join_session(&self, input: &str) -> Result<Option<AthleteSession>, SessionError> {
        let Some(code) = SessionCode::parse(input)? else {
            return Ok(None);
        };

        let Some(store) = &self.store else {
            tracing::info!(%code, "Joined session without a store; no updates will arrive");
            return Ok(Some(AthleteSession::detached(code)));
        };

        let mirror = Mirror::start(Arc::clone(store), code, self.ordering).await?;
        Ok(Some(AthleteSession::mirrored(mirror)))
    }
}

fn rng_for(config: &SessionConfig) -> StdRng {
    match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    }
}
