mod cli;
mod commands;
mod error;
mod input;
mod output;
mod writer;

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::error::CliError;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match run(&cli).await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

/// One-time logging setup; `RUST_LOG` wins over `--log-level`.
fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

async fn run(cli: &Cli) -> Result<ExitCode, CliError> {
    let output = commands::run(cli).await?;
    output::render(&output, cli.format, cli.pretty)?;

    let warnings = output.warnings();
    if cli.strict && !warnings.is_empty() {
        return Err(CliError::StrictModeViolation {
            warning_count: warnings.len(),
        });
    }

    Ok(ExitCode::SUCCESS)
}
