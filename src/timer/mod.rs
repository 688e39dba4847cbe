//! Work/rest interval timer: pure state machine plus its tick source

pub mod clock;
pub mod state;

pub use clock::{Ticker, TICK_PERIOD};
pub use state::{Durations, Phase, TickOutcome, TimerError, TimerState};

/// Format seconds as `m:ss`
pub fn format_clock(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
