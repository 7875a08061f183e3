use std::path::Path;

use magicrank_core::{Exchange, TickerList};
use tracing::debug;

use crate::error::CliError;

/// Reads and normalises the ticker list file.
///
/// Unreadable, empty or malformed lists fail here, before any fetching.
pub fn read_ticker_list(path: &Path, default_exchange: Exchange) -> Result<TickerList, CliError> {
    let text = std::fs::read_to_string(path).map_err(|source| CliError::TickerList {
        path: path.to_path_buf(),
        source,
    })?;
    let tickers = TickerList::parse(&text, default_exchange)?;
    debug!(path = %path.display(), count = tickers.len(), "ticker list loaded");
    Ok(tickers)
}
