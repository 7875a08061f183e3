mod fetch;
mod screen;
mod tickers;

use std::sync::Arc;

use magicrank_core::{FixtureSource, FundamentalsSource, YahooAdapter};
use tracing::info;

use crate::cli::{Cli, Command, SourceArgs};
use crate::error::CliError;

pub use fetch::FetchOutput;
pub use screen::ScreenOutput;
pub use tickers::TickersOutput;

/// Result of one command, rendered by [`crate::output`].
#[derive(Debug)]
pub enum CommandOutput {
    Screen(ScreenOutput),
    Tickers(TickersOutput),
    Fetch(FetchOutput),
}

impl CommandOutput {
    pub fn warnings(&self) -> &[String] {
        match self {
            Self::Screen(output) => &output.report.warnings,
            Self::Tickers(output) => &output.warnings,
            Self::Fetch(output) => &output.warnings,
        }
    }
}

pub async fn run(cli: &Cli) -> Result<CommandOutput, CliError> {
    match &cli.command {
        Command::Screen(args) => screen::run(args).await.map(CommandOutput::Screen),
        Command::Tickers(args) => tickers::run(args).map(CommandOutput::Tickers),
        Command::Fetch(args) => fetch::run(args).await.map(CommandOutput::Fetch),
    }
}

/// Builds the fundamentals source selected by the flags.
fn build_source(args: &SourceArgs) -> Result<Arc<dyn FundamentalsSource>, CliError> {
    if let Some(path) = &args.fixtures {
        let fixtures = FixtureSource::load(path).map_err(|source| CliError::Fixtures {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), records = fixtures.len(), "using fixture source");
        return Ok(Arc::new(fixtures));
    }

    let adapter = YahooAdapter::default()
        .with_session_cookie(args.yahoo_cookie.clone())
        .with_timeout_ms(args.http_timeout_ms);
    Ok(Arc::new(adapter))
}
