use anyhow::Result;
use circuit::cli::Cli;
use circuit::{util, App, Config};
use clap::Parser;
use std::fs::{self, OpenOptions};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    util::init_data_dir(cli.data_dir.clone());

    if cli.command.logs_to_stderr() {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::from_default_env()
                    .add_directive(tracing::Level::INFO.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    } else {
        // Initialize logging to file (~/.circuit/logs/circuit.log)
        fs::create_dir_all(util::logs_dir())?;

        let log_file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(util::log_file_path())?;

        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::from_default_env()
                    .add_directive(tracing::Level::WARN.into()),
            )
            .with_writer(log_file)
            .with_ansi(false) // Disable ANSI colors in log file
            .init();
    }

    let config_file = cli.config.clone().unwrap_or_else(util::config_path);
    let config = Config::load(&config_file)?;

    App::new(config).run(cli.command).await
}
