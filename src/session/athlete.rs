use tokio::sync::watch;

use super::{Session, SessionCode};
use crate::sync::Mirror;

enum Source {
    Mirror(Mirror),
    /// No store: the view never fills
    Detached(watch::Sender<Option<Session>>),
}

/// Read-only handle for an athlete following a coach
pub struct AthleteSession {
    code: SessionCode,
    source: Source,
}

impl AthleteSession {
    pub(crate) fn mirrored(mirror: Mirror) -> Self {
        Self {
            code: mirror.code().clone(),
            source: Source::Mirror(mirror),
        }
    }

    pub(crate) fn detached(code: SessionCode) -> Self {
        let (tx, _) = watch::channel(None);
        Self {
            code,
            source: Source::Detached(tx),
        }
    }

    pub fn code(&self) -> &SessionCode {
        &self.code
    }

    pub fn is_mirroring(&self) -> bool {
        matches!(&self.source, Source::Mirror(mirror) if mirror.is_active())
    }

    /// The coach's state as last received
    pub fn view(&self) -> Option<Session> {
        match &self.source {
            Source::Mirror(mirror) => mirror.view(),
            Source::Detached(_) => None,
        }
    }

    pub fn watch(&self) -> watch::Receiver<Option<Session>> {
        match &self.source {
            Source::Mirror(mirror) => mirror.watch(),
            Source::Detached(tx) => tx.subscribe(),
        }
    }

    /// Release the subscription
    pub fn leave(self) {
        if let Source::Mirror(mirror) = self.source {
            mirror.stop();
        }
        tracing::debug!(code = %self.code, "Left session");
    }
}
