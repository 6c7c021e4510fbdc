use std::io::{self, IsTerminal};
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use bough::{Cli, get_config, run};

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = match get_config(&cli) {
        Ok(config) => config,
        Err(error) => {
            // no subscriber yet: the log level comes from the config
            eprintln!("bough: {error}");
            return ExitCode::FAILURE;
        }
    };

    install_tracing(&config.log);

    match run(cli, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!("{error}");
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr; stdout carries the rendered page.
fn install_tracing(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .init();
}
