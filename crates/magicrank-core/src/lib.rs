//! # Magicrank Core
//!
//! Fetch, filter and rank pipeline for Joel Greenblatt's Magic Formula.
//!
//! ## Overview
//!
//! - **Ticker normalisation** from exchange-qualified listings (`LSE:POS`) to provider form (`POS.L`)
//! - **Fundamentals sources** behind one trait, with a Yahoo adapter and an offline fixture source
//! - **Fetch coordinator** with bounded concurrency, paced dispatch, rate-limit retry and a run timeout
//! - **Purity filter** computing earnings yield, ROTC, EV/EBIT and payback
//! - **Ranker** ordering valid tickers by combined rank
//! - **Partitioner** splitting every input ticker into ranked, missing or invalid
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Yahoo and fixture fundamentals sources |
//! | [`config`] | Run configuration and outlier screens |
//! | [`coordinator`] | Bounded, paced fan-out of fetches |
//! | [`data_source`] | Source trait and fetch failure taxonomy |
//! | [`domain`] | Tickers, raw fundamentals, scored records |
//! | [`error`] | Core error types |
//! | [`http_client`] | HTTP client abstraction |
//! | [`pipeline`] | End-to-end screening run |
//! | [`ranking`] | Magic Formula dual ranking |
//! | [`report`] | Partition and run metadata |
//! | [`retry`] | Rate-limit backoff |
//! | [`screen`] | Purity filter and metrics |
//! | [`throttling`] | Dispatch pacing |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use magicrank_core::{run_screen, Exchange, ScreenConfig, TickerList, YahooAdapter};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let tickers = TickerList::parse("LSE:POS, LSE:CRL", Exchange::Lse)?;
//!     let report = run_screen(Arc::new(YahooAdapter::default()), &tickers, ScreenConfig::default()).await?;
//!
//!     for entry in report.ranked() {
//!         println!("{} {}", entry.position, entry.record.ticker);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! TickerList ──▶ FetchCoordinator ──▶ FundamentalsSource (xN, paced)
//!                       │
//!                       ▼
//!              classify (purity filter)
//!                       │
//!                       ▼
//!           partition ──▶ rank ──▶ ScreenReport
//! ```

pub mod adapters;
pub mod config;
pub mod coordinator;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod pipeline;
pub mod ranking;
pub mod report;
pub mod retry;
pub mod screen;
pub mod throttling;

pub use adapters::{parse_summary, FixtureSource, YahooAdapter, YahooAuthManager};

pub use config::{OutlierScreens, ScreenConfig};

pub use coordinator::{FetchCoordinator, FetchReport};

pub use data_source::{FetchError, FetchErrorKind, FetchOutcome, FundamentalsSource, ProviderFailure};

pub use domain::{
    Classification, ClassificationTag, Exchange, InvalidEntry, MissingEntry, RawFundamentals,
    ScoredRecord, Ticker, TickerList,
};

pub use error::{CoreError, ValidationError};

pub use http_client::{HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};

pub use pipeline::{run_screen, ScreenPipeline};

pub use ranking::{rank, RankedEntry, RankedResult};

pub use report::{partition, Partition, RunCounts, RunMetadata, ScreenReport};

pub use retry::{Backoff, RetryPolicy};

pub use screen::{classify, classify_fundamentals, PurityViolation, EPSILON};

pub use throttling::{Pacer, TokioClock};
