//! End-to-end screening run: fetch, classify, rank, partition.

use std::sync::Arc;

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::coordinator::FetchCoordinator;
use crate::data_source::FundamentalsSource;
use crate::report::{partition, RunCounts, RunMetadata, ScreenReport};
use crate::screen::classify;
use crate::{CoreError, ScreenConfig, TickerList};

/// A validated source + configuration pair, reusable across runs.
pub struct ScreenPipeline {
    source: Arc<dyn FundamentalsSource>,
    config: ScreenConfig,
}

impl ScreenPipeline {
    pub fn new(source: Arc<dyn FundamentalsSource>, config: ScreenConfig) -> Result<Self, CoreError> {
        config.validate()?;
        Ok(Self { source, config })
    }

    pub async fn run(&self, tickers: &TickerList) -> ScreenReport {
        let run_id = Uuid::new_v4();
        let span = info_span!("screen", %run_id, source = self.source.name());
        self.run_inner(run_id, tickers).instrument(span).await
    }

    async fn run_inner(&self, run_id: Uuid, tickers: &TickerList) -> ScreenReport {
        let started_at = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_else(|_| String::from("<unformattable>"));

        let mut warnings = Vec::new();
        if !tickers.duplicates().is_empty() {
            let duplicates = tickers
                .duplicates()
                .iter()
                .map(|ticker| ticker.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            warn!(%duplicates, "duplicate tickers ignored");
            warnings.push(format!("duplicate tickers ignored: {duplicates}"));
        }

        let fetched = FetchCoordinator::new(Arc::clone(&self.source), &self.config)
            .fetch_all(tickers.tickers())
            .await;
        warnings.extend(fetched.warnings);

        let outliers = self.config.outliers;
        let results = partition(
            fetched
                .outcomes
                .into_iter()
                .map(|(ticker, outcome)| classify(&ticker, outcome, &outliers)),
        );

        let counts = RunCounts {
            requested: tickers.len(),
            ranked: results.ranked.len(),
            missing: results.missing.len(),
            invalid: results.invalid.len(),
        };
        info!(
            ranked = counts.ranked,
            missing = counts.missing,
            invalid = counts.invalid,
            "screen complete"
        );

        ScreenReport {
            meta: RunMetadata {
                run_id,
                started_at,
                elapsed_ms: u64::try_from(fetched.elapsed.as_millis()).unwrap_or(u64::MAX),
                source: self.source.name().to_owned(),
                timed_out: fetched.timed_out,
                counts,
            },
            results,
            warnings,
        }
    }
}

/// Validates `config` and runs one screen over `tickers`.
pub async fn run_screen(
    source: Arc<dyn FundamentalsSource>,
    tickers: &TickerList,
    config: ScreenConfig,
) -> Result<ScreenReport, CoreError> {
    let pipeline = ScreenPipeline::new(source, config)?;
    Ok(pipeline.run(tickers).await)
}
