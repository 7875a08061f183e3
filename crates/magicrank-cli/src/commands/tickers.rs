use magicrank_core::Ticker;
use serde::Serialize;

use crate::cli::TickersArgs;
use crate::error::CliError;
use crate::input::read_ticker_list;

#[derive(Debug, Serialize)]
pub struct TickersOutput {
    pub tickers: Vec<Ticker>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub duplicates: Vec<Ticker>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

pub fn run(args: &TickersArgs) -> Result<TickersOutput, CliError> {
    let list = read_ticker_list(&args.tickers, args.exchange)?;
    let duplicates = list.duplicates().to_vec();
    let warnings = if duplicates.is_empty() {
        Vec::new()
    } else {
        vec![format!("{} duplicate ticker(s) ignored", duplicates.len())]
    };

    Ok(TickersOutput {
        tickers: list.tickers().to_vec(),
        duplicates,
        warnings,
    })
}
