//! Session handlers for the relay API.

use std::convert::Infallible;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::stream::{self, Stream};

use super::error::RelayError;
use super::state::RelayState;
use crate::session::SessionCode;
use crate::store::{SharedStore, Snapshot};

fn store_path(code: &str) -> Result<String, RelayError> {
    let code: SessionCode = code.parse()?;
    Ok(code.store_path())
}

/// Replace the snapshot for a session.
pub async fn put_session(
    State(state): State<RelayState>,
    Path(code): Path<String>,
    Json(snapshot): Json<Snapshot>,
) -> Result<StatusCode, RelayError> {
    let path = store_path(&code)?;
    state.store().write(&path, snapshot).await?;
    tracing::debug!(%path, "Stored snapshot");
    Ok(StatusCode::NO_CONTENT)
}

/// Latest snapshot for a session.
pub async fn get_session(
    State(state): State<RelayState>,
    Path(code): Path<String>,
) -> Result<Json<Snapshot>, RelayError> {
    let path = store_path(&code)?;
    state
        .store()
        .read(&path)
        .map(Json)
        .ok_or(RelayError::NotFound(code))
}

/// Stream snapshots for a session as server-sent events.
///
/// The latest snapshot, if any, is sent first. The subscription is released
/// when the client disconnects.
pub async fn stream_session(
    State(state): State<RelayState>,
    Path(code): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, RelayError> {
    let path = store_path(&code)?;
    let subscription = state.store().subscribe(&path).await?;
    tracing::info!(%path, "Subscriber connected");

    let events = stream::unfold(subscription, |mut subscription| async move {
        let snapshot = subscription.next().await?;
        let event = Event::default().data(snapshot.to_string());
        Some((Ok(event), subscription))
    });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}
