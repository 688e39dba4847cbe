/// Errors returned by shared store backends
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store could not be reached at all
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Transport-level HTTP failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The store answered but refused the request
    #[error("Store rejected request for {path}: HTTP {status}")]
    Rejected { path: String, status: u16 },

    /// A subscription stream could not be opened
    #[error("Subscription to {path} failed: {reason}")]
    Subscribe { path: String, reason: String },
}
