//! Bounded, paced fan-out of fundamentals fetches.
//!
//! The coordinator owns the worker pool, the dispatch pacer and the retry
//! policy for one run. Every input ticker gets a pre-allocated result slot;
//! workers write only their own slot, and any slot still empty when the run
//! ends is filled with a provider error, so the report always holds exactly
//! one outcome per ticker.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::data_source::{FetchError, FetchOutcome, FundamentalsSource};
use crate::retry::RetryPolicy;
use crate::throttling::Pacer;
use crate::{ScreenConfig, Ticker};

type Slots = Arc<Mutex<Vec<Option<FetchOutcome>>>>;

/// Outcomes of the fetch phase, in input order.
#[derive(Debug, Clone)]
pub struct FetchReport {
    pub outcomes: Vec<(Ticker, FetchOutcome)>,
    /// Run-level conditions worth surfacing once (outage, timeout).
    pub warnings: Vec<String>,
    pub timed_out: bool,
    pub elapsed: Duration,
}

impl FetchReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| outcome.is_ok())
            .count()
    }
}

/// Fetches fundamentals for a ticker list without overwhelming the provider.
pub struct FetchCoordinator {
    source: Arc<dyn FundamentalsSource>,
    max_concurrency: usize,
    pacer: Pacer,
    retry: RetryPolicy,
    run_timeout: Duration,
}

impl FetchCoordinator {
    pub fn new(source: Arc<dyn FundamentalsSource>, config: &ScreenConfig) -> Self {
        Self {
            source,
            max_concurrency: config.max_concurrency.max(1),
            pacer: Pacer::new(config.request_delay, config.request_jitter),
            retry: config.retry_policy(),
            run_timeout: config.run_timeout,
        }
    }

    pub async fn fetch_all(&self, tickers: &[Ticker]) -> FetchReport {
        let started = Instant::now();
        let deadline = started + self.run_timeout;
        let slots: Slots = Arc::new(Mutex::new(vec![None; tickers.len()]));
        let mut tasks = JoinSet::new();

        info!(
            source = self.source.name(),
            tickers = tickers.len(),
            max_concurrency = self.max_concurrency,
            "fetching fundamentals"
        );

        let finished = tokio::time::timeout_at(
            deadline,
            self.dispatch(tickers, &slots, &mut tasks),
        )
        .await
        .is_ok();
        // Stop in-flight fetches before reading the slots.
        tasks.shutdown().await;

        let filled = std::mem::take(&mut *lock(&slots));
        let mut warnings = Vec::new();
        let mut unresolved = 0_usize;
        let outcomes = tickers
            .iter()
            .cloned()
            .zip(filled)
            .map(|(ticker, slot)| {
                let outcome = slot.unwrap_or_else(|| {
                    unresolved += 1;
                    Err(if finished {
                        FetchError::unavailable(format!("fetch task for {ticker} ended without a result"))
                    } else {
                        FetchError::timeout(format!(
                            "run timeout of {:?} elapsed before {ticker} resolved",
                            self.run_timeout
                        ))
                    })
                });
                (ticker, outcome)
            })
            .collect::<Vec<_>>();

        if !finished {
            warn!(unresolved, timeout = ?self.run_timeout, "run timeout elapsed");
            warnings.push(format!(
                "run timeout of {}s elapsed; {unresolved} ticker(s) recorded as timed out",
                self.run_timeout.as_secs_f64()
            ));
        }

        if !outcomes.is_empty()
            && outcomes
                .iter()
                .all(|(_, outcome)| matches!(outcome, Err(error) if error.is_provider_error()))
        {
            warn!(source = self.source.name(), "every fetch failed with a provider error");
            warnings.push(format!(
                "provider '{}' appears unavailable: all {} fetches failed with provider errors",
                self.source.name(),
                outcomes.len()
            ));
        }

        let report = FetchReport {
            outcomes,
            warnings,
            timed_out: !finished,
            elapsed: started.elapsed(),
        };
        info!(
            succeeded = report.succeeded(),
            total = tickers.len(),
            elapsed_ms = u64::try_from(report.elapsed.as_millis()).unwrap_or(u64::MAX),
            "fetch phase complete"
        );
        report
    }

    async fn dispatch(&self, tickers: &[Ticker], slots: &Slots, tasks: &mut JoinSet<()>) {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let completed = Arc::new(AtomicUsize::new(0));
        let total = tickers.len();

        for (index, ticker) in tickers.iter().enumerate() {
            let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
                break;
            };
            self.pacer.until_ready().await;

            let source = Arc::clone(&self.source);
            let retry = self.retry.clone();
            let slots = Arc::clone(slots);
            let completed = Arc::clone(&completed);
            let ticker = ticker.clone();
            tasks.spawn(async move {
                let outcome = fetch_with_retry(source.as_ref(), &ticker, &retry).await;
                drop(permit);

                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                match &outcome {
                    Ok(_) => debug!(%ticker, done, total, "fetched"),
                    Err(error) => debug!(%ticker, done, total, code = error.code(), "fetch failed"),
                }
                lock(&slots)[index] = Some(outcome);
            });
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(error) = joined {
                warn!(%error, "fetch task did not complete");
            }
        }
    }
}

async fn fetch_with_retry(
    source: &dyn FundamentalsSource,
    ticker: &Ticker,
    retry: &RetryPolicy,
) -> FetchOutcome {
    let mut retries = 0;
    loop {
        let error = match source.fetch(ticker).await {
            Ok(raw) => return Ok(raw),
            Err(error) => error,
        };

        let Some(delay) = retry.next_delay(&error, retries) else {
            return Err(error);
        };
        debug!(%ticker, retry = retries + 1, delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX), "rate limited; backing off");
        tokio::time::sleep(delay).await;
        retries += 1;
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
