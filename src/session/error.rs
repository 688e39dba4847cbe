use crate::store::StoreError;
use crate::timer::TimerError;

/// Errors from session lifecycle and coach operations
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Invalid session code '{0}': expected 6 letters or digits")]
    InvalidCode(String),

    #[error("A session needs at least one participant")]
    NoParticipants,

    #[error(transparent)]
    Timer(#[from] TimerError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
