#![forbid(unsafe_code)]

mod cli;
mod config;
mod constants;
mod error;
mod executor;
mod gui;
mod interpret;
mod pipeline;
mod request;

use std::process::ExitCode;

use clap::Parser;
use tracing::{Level as TraceLevel, info};
use tracing_subscriber::FmtSubscriber;

fn init_tracing() -> anyhow::Result<()> {
    // Parse log level from environment variable
    let log_level = match std::env::var("LOG_LEVEL")
        .unwrap_or_else(|_| "info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => TraceLevel::TRACE,
        "debug" => TraceLevel::DEBUG,
        "warn" => TraceLevel::WARN,
        "error" => TraceLevel::ERROR,
        _ => TraceLevel::INFO,
    };

    // stdout is reserved for command output
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn main() -> ExitCode {
    let cli = cli::Cli::parse();

    if let Err(err) = init_tracing() {
        eprintln!("Failed to initialize logging: {err}");
    }

    let result = if cli.gui {
        let path = cli.config_path();
        info!(config = %path.display(), "starting GUI");
        gui::run_gui(path)
    } else {
        cli::run(&cli)
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
