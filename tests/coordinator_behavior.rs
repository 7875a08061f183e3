//! Behaviour tests for the fetch coordinator.
//!
//! These tests verify HOW fetches are scheduled: the concurrency bound,
//! dispatch pacing, retry policy, failure isolation and outage reporting.
//! Time is paused, so sleeps inside fake sources cost nothing.

use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use magicrank_core::{
    FetchCoordinator, FetchError, FetchErrorKind, FetchOutcome, FundamentalsSource,
    RawFundamentals, ScreenConfig, Ticker,
};

/// Source that sleeps for `latency` and tracks how many calls overlap.
struct TrackingSource {
    latency: Duration,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    calls: AtomicUsize,
    not_found: HashSet<String>,
    rate_limited_once: Mutex<HashSet<String>>,
}

impl TrackingSource {
    fn new(latency: Duration) -> Self {
        Self {
            latency,
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
            not_found: HashSet::new(),
            rate_limited_once: Mutex::new(HashSet::new()),
        }
    }

    fn with_not_found(mut self, symbol: &str) -> Self {
        self.not_found.insert(symbol.to_owned());
        self
    }

    fn with_rate_limit_once(self, symbol: &str) -> Self {
        self.rate_limited_once
            .lock()
            .expect("lock")
            .insert(symbol.to_owned());
        self
    }
}

impl FundamentalsSource for TrackingSource {
    fn name(&self) -> &'static str {
        "tracking"
    }

    fn fetch<'a>(
        &'a self,
        ticker: &'a Ticker,
    ) -> Pin<Box<dyn Future<Output = FetchOutcome> + Send + 'a>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);

            tokio::time::sleep(self.latency).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.not_found.contains(ticker.as_str()) {
                return Err(FetchError::not_found(format!("unknown {ticker}")));
            }
            let first_limit = self
                .rate_limited_once
                .lock()
                .expect("lock")
                .remove(ticker.as_str());
            if first_limit {
                return Err(FetchError::rate_limited("429"));
            }
            Ok(RawFundamentals::new(ticker.clone()).with_ebit(1.0))
        })
    }
}

/// Source that always fails with a provider error.
struct DownSource;

impl FundamentalsSource for DownSource {
    fn name(&self) -> &'static str {
        "down"
    }

    fn fetch<'a>(
        &'a self,
        ticker: &'a Ticker,
    ) -> Pin<Box<dyn Future<Output = FetchOutcome> + Send + 'a>> {
        Box::pin(async move { Err(FetchError::unavailable(format!("connection refused for {ticker}"))) })
    }
}

fn tickers(count: usize) -> Vec<Ticker> {
    (0..count)
        .map(|index| Ticker::parse(&format!("T{index}.L")).expect("valid ticker"))
        .collect()
}

fn config(max_concurrency: usize, request_delay: Duration) -> ScreenConfig {
    ScreenConfig {
        max_concurrency,
        request_delay,
        ..ScreenConfig::default()
    }
}

// =============================================================================
// Concurrency bound
// =============================================================================

#[tokio::test(start_paused = true)]
async fn when_500_tickers_run_with_limit_10_no_more_than_10_fetches_overlap() {
    // Given: a slow source and a pool of ten workers
    let source = Arc::new(TrackingSource::new(Duration::from_millis(500)));
    let coordinator = FetchCoordinator::new(source.clone(), &config(10, Duration::from_millis(10)));

    // When: five hundred tickers are fetched
    let report = coordinator.fetch_all(&tickers(500)).await;

    // Then: every ticker resolved and overlap never exceeded the bound
    assert_eq!(report.outcomes.len(), 500);
    assert_eq!(report.succeeded(), 500);
    let peak = source.peak.load(Ordering::SeqCst);
    assert!(peak <= 10, "peak concurrency {peak} exceeded 10");
    assert_eq!(peak, 10, "pool should be saturated by slow fetches");
}

#[tokio::test(start_paused = true)]
async fn when_limit_is_one_fetches_run_strictly_one_at_a_time() {
    // Given: a single worker
    let source = Arc::new(TrackingSource::new(Duration::from_millis(50)));
    let coordinator = FetchCoordinator::new(source.clone(), &config(1, Duration::ZERO));

    // When: several tickers are fetched
    coordinator.fetch_all(&tickers(20)).await;

    // Then: no two fetches overlapped
    assert_eq!(source.peak.load(Ordering::SeqCst), 1);
}

// =============================================================================
// Pacing
// =============================================================================

#[tokio::test(start_paused = true)]
async fn when_request_delay_is_set_dispatches_are_spaced_by_it() {
    // Given: instant fetches paced at 100ms
    let source = Arc::new(TrackingSource::new(Duration::ZERO));
    let coordinator = FetchCoordinator::new(source, &config(5, Duration::from_millis(100)));
    let started = tokio::time::Instant::now();

    // When: ten tickers are fetched
    let report = coordinator.fetch_all(&tickers(10)).await;

    // Then: the ten dispatches needed at least nine intervals
    assert_eq!(report.succeeded(), 10);
    assert!(
        started.elapsed() >= Duration::from_millis(900),
        "elapsed {:?}",
        started.elapsed()
    );
}

// =============================================================================
// Retry policy and failure isolation
// =============================================================================

#[tokio::test(start_paused = true)]
async fn when_provider_rate_limits_once_the_fetch_is_retried_and_succeeds() {
    // Given: a source that rate-limits one ticker on its first call
    let source = Arc::new(TrackingSource::new(Duration::from_millis(5)).with_rate_limit_once("T1.L"));
    let coordinator = FetchCoordinator::new(source.clone(), &config(3, Duration::ZERO));

    // When: three tickers are fetched
    let report = coordinator.fetch_all(&tickers(3)).await;

    // Then: all succeed, with exactly one extra call for the retry
    assert_eq!(report.succeeded(), 3);
    assert_eq!(source.calls.load(Ordering::SeqCst), 4);
}

#[tokio::test(start_paused = true)]
async fn when_ticker_is_not_found_it_is_never_retried_and_others_continue() {
    // Given: a source that does not know one ticker
    let source = Arc::new(TrackingSource::new(Duration::from_millis(5)).with_not_found("T2.L"));
    let coordinator = FetchCoordinator::new(source.clone(), &config(2, Duration::ZERO));

    // When: five tickers are fetched
    let report = coordinator.fetch_all(&tickers(5)).await;

    // Then: the unknown ticker failed once and the rest succeeded
    assert_eq!(source.calls.load(Ordering::SeqCst), 5);
    assert_eq!(report.succeeded(), 4);
    let (ticker, outcome) = &report.outcomes[2];
    assert_eq!(ticker.as_str(), "T2.L");
    assert_eq!(
        outcome.as_ref().expect_err("unknown ticker").kind(),
        FetchErrorKind::NotFound
    );
    assert!(report.warnings.is_empty());
}

// =============================================================================
// Outage and timeout
// =============================================================================

#[tokio::test(start_paused = true)]
async fn when_every_fetch_fails_with_provider_error_one_outage_warning_is_reported() {
    // Given: a provider that refuses every connection
    let coordinator = FetchCoordinator::new(Arc::new(DownSource), &config(4, Duration::ZERO));

    // When: a full list is fetched
    let report = coordinator.fetch_all(&tickers(12)).await;

    // Then: every ticker was still attempted and one run-level warning emitted
    assert_eq!(report.outcomes.len(), 12);
    assert_eq!(report.succeeded(), 0);
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("appears unavailable"));
}

#[tokio::test(start_paused = true)]
async fn when_run_timeout_elapses_pending_fetches_become_timeouts() {
    // Given: fetches slower than the run budget
    let source = Arc::new(TrackingSource::new(Duration::from_secs(30)));
    let config = ScreenConfig {
        max_concurrency: 2,
        request_delay: Duration::ZERO,
        run_timeout: Duration::from_secs(45),
        ..ScreenConfig::default()
    };
    let coordinator = FetchCoordinator::new(source, &config);

    // When: six tickers are fetched
    let report = coordinator.fetch_all(&tickers(6)).await;

    // Then: the first wave completed and the rest were recorded as timeouts
    assert!(report.timed_out);
    assert_eq!(report.outcomes.len(), 6);
    assert_eq!(report.succeeded(), 2);
    let timeouts = report
        .outcomes
        .iter()
        .filter(|(_, outcome)| {
            matches!(outcome, Err(error) if error.code() == "fetch.timeout")
        })
        .count();
    assert_eq!(timeouts, 4);
    assert!(report.warnings.iter().any(|warning| warning.contains("run timeout")));
}
