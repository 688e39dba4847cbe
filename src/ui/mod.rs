//! Plain-text rendering of session state for the terminal

mod console;

pub use console::{station_list, status_line, waiting_line, CONTROLS_HELP};
