//! Command-line interface definition

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::sync::ReplicationOrdering;

#[derive(Debug, Parser)]
#[command(name = "circuit")]
#[command(version, about = "Work/rest interval timer shared from a coach to athletes", long_about = None)]
pub struct Cli {
    /// Config file (defaults to <data-dir>/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Data directory for config and logs (defaults to ~/.circuit)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the timer on this device only
    Solo(TimerArgs),
    /// Create a session and share it with athletes
    Coach(TimerArgs),
    /// Follow a coach's session
    Join {
        /// Six-character session code (case-insensitive)
        code: String,
        /// Relay base URL
        #[arg(long)]
        store: Option<String>,
        /// How to treat snapshots that arrive out of order
        #[arg(long, value_enum)]
        ordering: Option<ReplicationOrdering>,
    },
    /// Serve the shared store over HTTP
    Relay {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    /// Print a new session code
    Code,
}

impl Command {
    /// Whether logs should go to stderr rather than the log file
    pub fn logs_to_stderr(&self) -> bool {
        matches!(self, Command::Relay { .. })
    }
}

/// Session settings shared by `solo` and `coach`
#[derive(Debug, Clone, Default, Args)]
pub struct TimerArgs {
    /// Number of participants (one station each, at most 10 distinct)
    #[arg(long, short = 'n')]
    pub participants: Option<usize>,
    /// Work phase length in seconds
    #[arg(long)]
    pub work: Option<u32>,
    /// Rest phase length in seconds
    #[arg(long)]
    pub rest: Option<u32>,
    /// Relay base URL (coach only)
    #[arg(long)]
    pub store: Option<String>,
}
