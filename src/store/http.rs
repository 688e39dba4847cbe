use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use reqwest_eventsource::retry::Never;
use reqwest_eventsource::{Event, EventSource, RequestBuilderExt};

use super::{SharedStore, Snapshot, StoreError, Subscription};

/// Reconnect policy for subscription streams.
///
/// A subscription gives up after `max_retries` consecutive failed attempts.
/// The count starts over whenever a stream opens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryConfig {
    pub initial_delay: Duration,
    pub factor: f64,
    pub max_delay: Duration,
    pub max_retries: usize,
}

impl RetryConfig {
    /// Wait before reconnect attempt `attempt` (1-based)
    pub fn delay(&self, attempt: usize) -> Duration {
        let exponent = attempt.saturating_sub(1).min(32) as i32;
        let secs = self.initial_delay.as_secs_f64() * self.factor.powi(exponent);
        Duration::try_from_secs_f64(secs).map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(500),
            factor: 2.0,
            max_delay: Duration::from_secs(10),
            max_retries: 5,
        }
    }
}

/// Default bound on a single `PUT`
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(5);

/// Store client for a relay server.
///
/// Writes are `PUT {base}/{path}`; subscriptions read the Server-Sent Events
/// stream at `{base}/{path}/stream`.
#[derive(Clone)]
pub struct HttpStore {
    client: Client,
    base_url: String,
    retry: RetryConfig,
    write_timeout: Duration,
}

impl HttpStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            retry: RetryConfig::default(),
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Open one SSE connection. Reconnects are driven by the subscription
    /// loop, so the stream itself never retries.
    fn open_stream(&self, path: &str) -> Result<EventSource, StoreError> {
        let mut events = self
            .client
            .get(format!("{}/stream", self.url(path)))
            .eventsource()
            .map_err(|err| StoreError::Subscribe {
                path: path.to_string(),
                reason: err.to_string(),
            })?;

        events.set_retry_policy(Box::new(Never));
        Ok(events)
    }
}

#[async_trait]
impl SharedStore for HttpStore {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn probe(&self) -> Result<(), StoreError> {
        let url = format!("{}/api/health", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| StoreError::Unavailable(err.to_string()))?;

        if !response.status().is_success() {
            return Err(StoreError::Rejected {
                path: "api/health".to_string(),
                status: response.status().as_u16(),
            });
        }

        Ok(())
    }

    async fn write(&self, path: &str, snapshot: Snapshot) -> Result<(), StoreError> {
        let response = self
            .client
            .put(self.url(path))
            .timeout(self.write_timeout)
            .json(&snapshot)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StoreError::Rejected {
                path: path.to_string(),
                status: response.status().as_u16(),
            });
        }

        Ok(())
    }

    async fn subscribe(&self, path: &str) -> Result<Subscription, StoreError> {
        let mut events = self.open_stream(path)?;
        let (feed, subscription) = Subscription::channel(path);
        let store = self.clone();
        let path = path.to_string();

        tokio::spawn(async move {
            let mut failures = 0usize;
            loop {
                let event = tokio::select! {
                    _ = feed.cancelled() => break,
                    event = events.next() => event,
                };

                let reason = match event {
                    Some(Ok(Event::Open)) => {
                        failures = 0;
                        tracing::debug!(%path, "Subscription stream opened");
                        continue;
                    }
                    Some(Ok(Event::Message(message))) => {
                        match serde_json::from_str::<Snapshot>(&message.data) {
                            Ok(snapshot) => {
                                if !feed.send(snapshot).await {
                                    break;
                                }
                            }
                            Err(err) => {
                                tracing::warn!(%path, error = %err, "Dropping unparseable snapshot");
                            }
                        }
                        continue;
                    }
                    Some(Err(err)) => err.to_string(),
                    None => "stream ended".to_string(),
                };

                events.close();
                failures += 1;
                if failures > store.retry.max_retries {
                    tracing::warn!(
                        %path,
                        attempts = store.retry.max_retries,
                        reason = %reason,
                        "Subscription lost; giving up"
                    );
                    break;
                }

                let delay = store.retry.delay(failures);
                tracing::debug!(
                    %path,
                    attempt = failures,
                    delay_ms = delay.as_millis() as u64,
                    reason = %reason,
                    "Subscription stream lost; reconnecting"
                );
                tokio::select! {
                    _ = feed.cancelled() => break,
                    _ = tokio::time::sleep(delay) => {}
                }

                events = match store.open_stream(&path) {
                    Ok(events) => events,
                    Err(err) => {
                        tracing::warn!(%path, error = %err, "Failed to reopen subscription");
                        break;
                    }
                };
            }

            events.close();
        });

        Ok(subscription)
    }
}
