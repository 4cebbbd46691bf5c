mod cli;
mod commands;
mod config;
mod error;

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = cli::Cli::parse();
    let config = match config::CliConfig::from_env() {
        Ok(config) => commands::effective_config(&cli, config),
        Err(e) => {
            eprintln!("error: {}", error::CliError::from(e));
            return ExitCode::FAILURE;
        }
    };

    let mut stdout = std::io::stdout();
    match commands::run(cli.command, config, &mut stdout).await {
        Ok(outcome) => outcome.into(),
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
