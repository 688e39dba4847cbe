//! Shared test utilities for circuit
//!
//! - Seeded session configs so station deals are reproducible
//! - An in-process relay bound to an ephemeral port
//! - Raw TCP servers that misbehave in controlled ways
//! - Helpers that wait on watched session views

#![allow(dead_code)]

use std::time::Duration;

use circuit::relay::{self, RelayConfig, RelayState};
use circuit::{MemoryStore, Session, SessionConfig};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Upper bound for any single wait in these tests
pub const WAIT: Duration = Duration::from_secs(5);

/// Session config with a fixed shuffle seed
pub fn seeded_config(participants: usize, work: u32, rest: u32) -> SessionConfig {
    SessionConfig::new(participants, work, rest)
        .expect("valid session config")
        .with_seed(1234)
}

/// Relay serving `store` on 127.0.0.1 with an OS-assigned port
pub struct TestRelay {
    pub base_url: String,
    pub store: MemoryStore,
    task: JoinHandle<()>,
}

impl TestRelay {
    pub async fn start() -> Self {
        let store = MemoryStore::new();
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind relay listener");
        let addr = listener.local_addr().expect("relay address");

        let state = RelayState::new(store.clone());
        let config = RelayConfig::default();
        let task = tokio::spawn(async move {
            if let Err(err) = relay::serve(listener, state, &config).await {
                eprintln!("relay stopped: {err}");
            }
        });

        Self {
            base_url: format!("http://{addr}"),
            store,
            task,
        }
    }
}

impl Drop for TestRelay {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Address on 127.0.0.1 with nothing listening
pub async fn refused_addr() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local address");
    drop(listener);
    format!("http://{addr}")
}

/// Server answering connection `n` (0-based) with `respond(n)` and then
/// closing it. Returns the base URL.
pub async fn scripted_server<F>(respond: F) -> (String, JoinHandle<()>)
where
    F: Fn(usize) -> String + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local address");
    let task = tokio::spawn(async move {
        let mut served = 0;
        while let Ok((mut socket, _)) = listener.accept().await {
            read_request_head(&mut socket).await;
            let _ = socket.write_all(respond(served).as_bytes()).await;
            let _ = socket.shutdown().await;
            served += 1;
        }
    });
    (format!("http://{addr}"), task)
}

/// Server that accepts connections and never answers
pub async fn stalled_server() -> (String, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local address");
    let task = tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    (format!("http://{addr}"), task)
}

/// Single SSE event on a response that ends after it
pub fn sse_response(data: &str) -> String {
    format!(
        "HTTP/1.1 200 OK\r\ncontent-type: text/event-stream\r\ncache-control: no-cache\r\nconnection: close\r\n\r\ndata: {data}\n\n"
    )
}

/// Empty response with the given status line, e.g. `502 Bad Gateway`
pub fn status_response(status: &str) -> String {
    format!("HTTP/1.1 {status}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n")
}

async fn read_request_head(socket: &mut TcpStream) {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => head.extend_from_slice(&buf[..n]),
        }
    }
}

/// Wait until the athlete view satisfies `pred`, returning that view
pub async fn wait_for_view<F>(rx: &mut watch::Receiver<Option<Session>>, mut pred: F) -> Session
where
    F: FnMut(&Session) -> bool,
{
    let view = tokio::time::timeout(
        WAIT,
        rx.wait_for(|view| view.as_ref().is_some_and(|s| pred(s))),
    )
    .await
    .expect("timed out waiting for athlete view")
    .expect("mirror closed");
    view.clone().expect("view present")
}
