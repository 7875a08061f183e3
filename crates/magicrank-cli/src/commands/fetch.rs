use magicrank_core::{
    FetchCoordinator, FetchOutcome, RawFundamentals, ScreenConfig, Ticker, TickerList,
};
use serde::Serialize;

use crate::cli::FetchArgs;
use crate::error::CliError;

use super::build_source;

#[derive(Debug, Serialize)]
pub struct FetchedTicker {
    pub ticker: Ticker,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fundamentals: Option<RawFundamentals>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<FetchFailure>,
}

#[derive(Debug, Serialize)]
pub struct FetchFailure {
    pub code: &'static str,
    pub message: String,
    pub retryable: bool,
}

#[derive(Debug, Serialize)]
pub struct FetchOutput {
    pub results: Vec<FetchedTicker>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl FetchedTicker {
    fn new(ticker: Ticker, outcome: FetchOutcome) -> Self {
        match outcome {
            Ok(fundamentals) => Self {
                ticker,
                fundamentals: Some(fundamentals),
                error: None,
            },
            Err(error) => Self {
                ticker,
                fundamentals: None,
                error: Some(FetchFailure {
                    code: error.code(),
                    message: error.message().to_owned(),
                    retryable: error.retryable(),
                }),
            },
        }
    }
}

pub async fn run(args: &FetchArgs) -> Result<FetchOutput, CliError> {
    let tickers = args
        .symbols
        .iter()
        .map(|symbol| Ticker::from_listing(symbol, args.exchange))
        .collect::<Result<Vec<_>, _>>()?;
    let tickers = TickerList::from_tickers(tickers)?;
    let source = build_source(&args.source)?;

    let report = FetchCoordinator::new(source, &ScreenConfig::default())
        .fetch_all(tickers.tickers())
        .await;

    Ok(FetchOutput {
        results: report
            .outcomes
            .into_iter()
            .map(|(ticker, outcome)| FetchedTicker::new(ticker, outcome))
            .collect(),
        warnings: report.warnings,
    })
}
