//! HTTP relay that shares a [`MemoryStore`](crate::store::MemoryStore)
//! between processes
//!
//! Coaches `PUT` snapshots, athletes follow them over server-sent events.
//! [`HttpStore`](crate::store::HttpStore) is the matching client.

mod error;
mod handlers;
mod server;
mod state;

pub use error::RelayError;
pub use server::{build_router, run_server, serve, RelayConfig};
pub use state::RelayState;
