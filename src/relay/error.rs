//! HTTP-facing errors for the relay.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::session::SessionError;
use crate::store::StoreError;

/// Error type for relay API operations.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// Path segment is not a session code.
    #[error("Invalid session code: {0}")]
    InvalidCode(String),

    /// No snapshot has been written for this session.
    #[error("Session not found: {0}")]
    NotFound(String),

    /// Backing store failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Anything the client could not have caused.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<SessionError> for RelayError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::InvalidCode(code) => RelayError::InvalidCode(code),
            SessionError::Store(err) => RelayError::Store(err),
            other @ (SessionError::NoParticipants | SessionError::Timer(_)) => {
                RelayError::Internal(other.to_string())
            }
        }
    }
}

/// Error response body.
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let (status, error_message, details) = match &self {
            RelayError::InvalidCode(code) => {
                (StatusCode::BAD_REQUEST, "Bad Request", Some(code.clone()))
            }
            RelayError::NotFound(code) => (StatusCode::NOT_FOUND, "Not Found", Some(code.clone())),
            RelayError::Store(e) => {
                tracing::error!(error = %e, "Relay store error");
                (StatusCode::SERVICE_UNAVAILABLE, "Store Unavailable", None)
            }
            RelayError::Internal(e) => {
                tracing::error!(error = %e, "Relay internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", None)
            }
        };

        let body = Json(ErrorResponse {
            error: error_message.to_string(),
            details,
        });

        (status, body).into_response()
    }
}
