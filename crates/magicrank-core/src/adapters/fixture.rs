use std::collections::HashMap;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;

use crate::data_source::{FetchError, FetchOutcome, FundamentalsSource};
use crate::{CoreError, RawFundamentals, Ticker};

/// In-memory fundamentals keyed by provider symbol.
///
/// Backs offline runs (`--fixtures`) and deterministic tests. The JSON file
/// format is an array of [`RawFundamentals`] objects.
#[derive(Debug, Clone, Default)]
pub struct FixtureSource {
    records: HashMap<Ticker, RawFundamentals>,
}

impl FixtureSource {
    pub fn new(records: impl IntoIterator<Item = RawFundamentals>) -> Self {
        Self {
            records: records
                .into_iter()
                .map(|record| (record.ticker.clone(), record))
                .collect(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let records: Vec<RawFundamentals> = serde_json::from_str(json)?;
        Ok(Self::new(records))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FundamentalsSource for FixtureSource {
    fn name(&self) -> &'static str {
        "fixture"
    }

    fn fetch<'a>(
        &'a self,
        ticker: &'a Ticker,
    ) -> Pin<Box<dyn Future<Output = FetchOutcome> + Send + 'a>> {
        let outcome = self
            .records
            .get(ticker)
            .cloned()
            .ok_or_else(|| FetchError::not_found(format!("no fixture for {ticker}")));
        Box::pin(async move { outcome })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::FetchErrorKind;

    #[tokio::test]
    async fn loads_json_array_and_serves_by_ticker() {
        let source = FixtureSource::from_json(
            r#"[{"ticker": "pos.l", "ebit": 10.0, "market_cap": 40.0, "net_ppe": 9.0}]"#,
        )
        .expect("fixture json should parse");
        assert_eq!(source.len(), 1);

        let ticker = Ticker::parse("POS.L").expect("valid ticker");
        let raw = source.fetch(&ticker).await.expect("fixture present");
        assert_eq!(raw.ebit, Some(10.0));
        assert_eq!(raw.tangible_capital(), Some(9.0));
    }

    #[tokio::test]
    async fn unknown_ticker_is_not_found() {
        let source = FixtureSource::default();
        let ticker = Ticker::parse("NOPE.L").expect("valid ticker");

        let error = source.fetch(&ticker).await.expect_err("must fail");
        assert_eq!(error.kind(), FetchErrorKind::NotFound);
    }

    #[test]
    fn rejects_invalid_ticker_in_fixture() {
        let result = FixtureSource::from_json(r#"[{"ticker": "$$$"}]"#);
        assert!(matches!(result, Err(CoreError::Serialization(_))));
    }
}
