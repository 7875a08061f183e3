//! CLI argument definitions for magicrank.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `screen` | Fetch, filter and rank a ticker list, writing three CSV reports |
//! | `tickers` | Normalise a ticker list without touching the network |
//! | `fetch` | Print raw fundamentals for one or more symbols |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `table` | Output format (table, json) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--strict` | `false` | Exit 5 when the run produced warnings |
//! | `--log-level` | `warn` | Log filter when `RUST_LOG` is unset |
//!
//! Run options left unset fall back to [`ScreenConfig::default`].
//!
//! # Examples
//!
//! ```bash
//! magicrank screen --tickers potential_stocks.txt --output-dir out
//! magicrank screen --fixtures fundamentals.json --format json --pretty
//! magicrank tickers --tickers potential_stocks.txt --exchange NYSE
//! magicrank fetch LSE:POS LSE:CRL
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use magicrank_core::{Exchange, OutlierScreens, ScreenConfig};

/// Magic Formula stock screener.
///
/// Ranks a ticker list by combined earnings yield and return on tangible
/// capital, and reports tickers with missing or invalid fundamentals.
#[derive(Debug, Parser)]
#[command(name = "magicrank", author, version, about = "Magic Formula stock screener")]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, env = "MAGICRANK_FORMAT", default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Treat run warnings as failures (exit code 5).
    #[arg(long, global = true, env = "MAGICRANK_STRICT", default_value_t = false)]
    pub strict: bool,

    /// Log filter used when `RUST_LOG` is not set (e.g. info, magicrank_core=debug).
    #[arg(long, global = true, env = "MAGICRANK_LOG", default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned text for terminal display.
    Table,
    /// Single JSON document.
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the full screen and write the ranked, missing and invalid reports.
    ///
    ///   magicrank screen
    ///   magicrank screen --tickers list.txt --output-dir out --max-concurrency 3
    Screen(ScreenArgs),

    /// Parse and normalise a ticker list, printing provider symbols.
    Tickers(TickersArgs),

    /// Fetch raw fundamentals for one or more symbols.
    ///
    ///   magicrank fetch LSE:POS CRL.L
    Fetch(FetchArgs),
}

/// Where fundamentals come from.
#[derive(Debug, Clone, Args)]
pub struct SourceArgs {
    /// Read fundamentals from a JSON fixture file instead of Yahoo Finance.
    #[arg(long, env = "MAGICRANK_FIXTURES")]
    pub fixtures: Option<PathBuf>,

    /// Explicit Yahoo session cookie (skips the cookie handshake).
    #[arg(long, env = "YAHOO_COOKIE", hide_env_values = true)]
    pub yahoo_cookie: Option<String>,

    /// Per-request HTTP timeout in milliseconds.
    #[arg(long, env = "MAGICRANK_HTTP_TIMEOUT_MS", default_value_t = 10_000)]
    pub http_timeout_ms: u64,
}

#[derive(Debug, Clone, Args)]
pub struct ScreenArgs {
    /// File of comma- or newline-separated symbols (e.g. LSE:POS).
    #[arg(long, env = "MAGICRANK_TICKERS", default_value = "potential_stocks.txt")]
    pub tickers: PathBuf,

    /// Directory receiving the three CSV reports.
    #[arg(long, env = "MAGICRANK_OUTPUT_DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Exchange assumed for bare symbols.
    #[arg(long, env = "MAGICRANK_EXCHANGE")]
    pub exchange: Option<Exchange>,

    /// Maximum simultaneous fetches.
    #[arg(long, env = "MAGICRANK_MAX_CONCURRENCY")]
    pub max_concurrency: Option<usize>,

    /// Minimum spacing between fetch dispatches, in milliseconds.
    #[arg(long, env = "MAGICRANK_REQUEST_DELAY_MS")]
    pub request_delay_ms: Option<u64>,

    /// Random extra delay of up to this many milliseconds per dispatch.
    #[arg(long, env = "MAGICRANK_REQUEST_JITTER_MS")]
    pub request_jitter_ms: Option<u64>,

    /// Budget for the whole fetch phase, in seconds.
    #[arg(long, env = "MAGICRANK_RUN_TIMEOUT_SECS")]
    pub run_timeout_secs: Option<u64>,

    /// Retries for rate-limited fetches.
    #[arg(long, env = "MAGICRANK_MAX_RETRIES")]
    pub max_retries: Option<u32>,

    #[arg(long, env = "MAGICRANK_RETRY_BASE_DELAY_MS")]
    pub retry_base_delay_ms: Option<u64>,

    #[arg(long, env = "MAGICRANK_RETRY_MAX_DELAY_MS")]
    pub retry_max_delay_ms: Option<u64>,

    /// Enable the historical outlier screens (TC >= 1e6, ROTC <= 200%, EY <= 100%).
    #[arg(long, default_value_t = false)]
    pub classic_screens: bool,

    #[arg(long, env = "MAGICRANK_MIN_TANGIBLE_CAPITAL")]
    pub min_tangible_capital: Option<f64>,

    /// Upper bound on ROTC as a ratio (2.0 = 200%).
    #[arg(long, env = "MAGICRANK_MAX_ROTC")]
    pub max_rotc: Option<f64>,

    /// Upper bound on earnings yield as a ratio.
    #[arg(long, env = "MAGICRANK_MAX_EARNINGS_YIELD")]
    pub max_earnings_yield: Option<f64>,

    /// Show only the first N ranked rows in table output.
    #[arg(long)]
    pub top: Option<usize>,

    #[command(flatten)]
    pub source: SourceArgs,
}

impl ScreenArgs {
    /// Overlays the flags that were given onto the default configuration.
    pub fn screen_config(&self) -> ScreenConfig {
        let defaults = ScreenConfig::default();
        let mut outliers = if self.classic_screens {
            OutlierScreens::classic()
        } else {
            defaults.outliers
        };
        outliers.min_tangible_capital = self.min_tangible_capital.or(outliers.min_tangible_capital);
        outliers.max_rotc = self.max_rotc.or(outliers.max_rotc);
        outliers.max_earnings_yield = self.max_earnings_yield.or(outliers.max_earnings_yield);

        ScreenConfig {
            max_concurrency: self.max_concurrency.unwrap_or(defaults.max_concurrency),
            request_delay: self
                .request_delay_ms
                .map_or(defaults.request_delay, Duration::from_millis),
            request_jitter: self
                .request_jitter_ms
                .map_or(defaults.request_jitter, Duration::from_millis),
            run_timeout: self
                .run_timeout_secs
                .map_or(defaults.run_timeout, Duration::from_secs),
            max_retries: self.max_retries.unwrap_or(defaults.max_retries),
            retry_base_delay: self
                .retry_base_delay_ms
                .map_or(defaults.retry_base_delay, Duration::from_millis),
            retry_max_delay: self
                .retry_max_delay_ms
                .map_or(defaults.retry_max_delay, Duration::from_millis),
            default_exchange: self.exchange.unwrap_or(defaults.default_exchange),
            outliers,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct TickersArgs {
    #[arg(long, env = "MAGICRANK_TICKERS", default_value = "potential_stocks.txt")]
    pub tickers: PathBuf,

    #[arg(long, env = "MAGICRANK_EXCHANGE", default_value_t = Exchange::Lse)]
    pub exchange: Exchange,
}

#[derive(Debug, Clone, Args)]
pub struct FetchArgs {
    /// Symbols in listing (LSE:POS) or provider (POS.L) form.
    #[arg(required = true, num_args = 1..)]
    pub symbols: Vec<String>,

    #[arg(long, env = "MAGICRANK_EXCHANGE", default_value_t = Exchange::Lse)]
    pub exchange: Exchange,

    #[command(flatten)]
    pub source: SourceArgs,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).expect("arguments parse")
    }

    #[test]
    fn screen_defaults_match_core_defaults() {
        let cli = parse(&["magicrank", "screen"]);
        let Command::Screen(args) = cli.command else {
            panic!("expected screen");
        };

        assert_eq!(args.tickers, PathBuf::from("potential_stocks.txt"));
        assert_eq!(args.screen_config(), ScreenConfig::default());
        assert_eq!(cli.format, OutputFormat::Table);
    }

    #[test]
    fn flags_override_individual_settings() {
        let cli = parse(&[
            "magicrank",
            "screen",
            "--max-concurrency",
            "3",
            "--request-delay-ms",
            "250",
            "--exchange",
            "nyse",
            "--classic-screens",
            "--max-rotc",
            "5",
            "--format",
            "json",
        ]);
        let Command::Screen(args) = cli.command else {
            panic!("expected screen");
        };
        let config = args.screen_config();

        assert_eq!(config.max_concurrency, 3);
        assert_eq!(config.request_delay, Duration::from_millis(250));
        assert_eq!(config.default_exchange, Exchange::Nyse);
        assert_eq!(config.outliers.max_rotc, Some(5.0));
        assert_eq!(config.outliers.min_tangible_capital, Some(1_000_000.0));
        assert_eq!(config.run_timeout, ScreenConfig::default().run_timeout);
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn fetch_requires_a_symbol() {
        assert!(Cli::try_parse_from(["magicrank", "fetch"]).is_err());
    }

    #[test]
    fn unknown_exchange_is_rejected_at_parse_time() {
        assert!(Cli::try_parse_from(["magicrank", "tickers", "--exchange", "MOON"]).is_err());
    }
}
