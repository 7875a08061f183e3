use magicrank_core::{run_screen, ScreenReport};
use serde::Serialize;

use crate::cli::ScreenArgs;
use crate::error::CliError;
use crate::input::read_ticker_list;
use crate::writer::{ensure_writable, write_report, ReportFiles};

use super::build_source;

#[derive(Debug, Serialize)]
pub struct ScreenOutput {
    #[serde(flatten)]
    pub report: ScreenReport,
    pub files: ReportFiles,
    #[serde(skip)]
    pub top: Option<usize>,
}

pub async fn run(args: &ScreenArgs) -> Result<ScreenOutput, CliError> {
    // Every run-level failure surfaces here, before the first fetch.
    let config = args.screen_config();
    config.validate()?;
    let tickers = read_ticker_list(&args.tickers, config.default_exchange)?;
    ensure_writable(&args.output_dir)?;
    let source = build_source(&args.source)?;

    let report = run_screen(source, &tickers, config).await?;
    let files = write_report(&args.output_dir, &report)?;

    Ok(ScreenOutput {
        report,
        files,
        top: args.top,
    })
}
