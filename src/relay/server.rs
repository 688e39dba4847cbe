//! Axum server for the session relay.

use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    http::{header, Method},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers;
use super::state::RelayState;
use crate::config::RelaySettings;

/// Shortest interval between idle-session sweeps
const MIN_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Server configuration options.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Allow requests from any origin.
    pub cors_permissive: bool,
    /// Purge sessions idle for this long. Sessions live forever when unset.
    pub session_ttl: Option<Duration>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7420,
            cors_permissive: true,
            session_ttl: None,
        }
    }
}

impl From<&RelaySettings> for RelayConfig {
    fn from(settings: &RelaySettings) -> Self {
        Self {
            host: settings.host.clone(),
            port: settings.port,
            cors_permissive: settings.cors_permissive,
            session_ttl: settings.session_ttl,
        }
    }
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Health check endpoint handler.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Build the Axum router with all routes.
pub fn build_router(state: RelayState, cors_permissive: bool) -> Router {
    let cors = if cors_permissive {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::PUT])
            .allow_headers([header::CONTENT_TYPE])
    } else {
        CorsLayer::new()
            .allow_methods([Method::GET, Method::PUT])
            .allow_headers([header::CONTENT_TYPE])
    };

    Router::new()
        .route("/api/health", get(health))
        .route(
            "/sessions/{code}",
            get(handlers::get_session).put(handlers::put_session),
        )
        .route("/sessions/{code}/stream", get(handlers::stream_session))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn spawn_sweeper(state: RelayState, ttl: Duration) -> tokio::task::JoinHandle<()> {
    let period = (ttl / 2).max(MIN_SWEEP_INTERVAL);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            for path in state.store().purge_idle(ttl) {
                tracing::info!(%path, "Purged idle session");
            }
        }
    })
}

/// Serve the relay on an already-bound listener until the task is dropped.
pub async fn serve(listener: TcpListener, state: RelayState, config: &RelayConfig) -> anyhow::Result<()> {
    let sweeper = config
        .session_ttl
        .map(|ttl| spawn_sweeper(state.clone(), ttl));

    let app = build_router(state, config.cors_permissive);
    let result = axum::serve(listener, app).await;

    if let Some(sweeper) = sweeper {
        sweeper.abort();
    }
    result?;
    Ok(())
}

/// Run the relay server.
///
/// This binds the configured address and blocks until shutdown.
pub async fn run_server(state: RelayState, config: RelayConfig) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = TcpListener::bind(addr).await?;

    tracing::info!("Starting relay at http://{}", listener.local_addr()?);
    serve(listener, state, &config).await
}
