//! Cancellable 1 Hz tick source

use std::ops::ControlFlow;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

/// Default tick period for the interval timer
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Owns at most one periodic task.
///
/// Spawning replaces any task already running. The task is aborted on
/// [`Ticker::cancel`] and when the ticker is dropped.
pub struct Ticker {
    period: Duration,
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            handle: None,
        }
    }

    /// Run `on_tick` once per period, first call one period from now.
    ///
    /// Stops on its own when the callback returns `ControlFlow::Break`.
    /// Must be called from within a Tokio runtime.
    pub fn spawn<F>(&mut self, mut on_tick: F)
    where
        F: FnMut() -> ControlFlow<()> + Send + 'static,
    {
        self.cancel();

        let period = self.period;
        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(time::Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if on_tick().is_break() {
                    break;
                }
            }
        });

        self.handle = Some(handle);
    }

    /// Abort the pending task, if any
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub fn is_active(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Default for Ticker {
    fn default() -> Self {
        Self::new(TICK_PERIOD)
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.cancel();
    }
}
