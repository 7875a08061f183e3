//! CSV report files.
//!
//! A completed run always writes all three files, header-only when a set is
//! empty. Each file is written to a temporary sibling and renamed into place.

use std::fs;
use std::path::{Path, PathBuf};

use magicrank_core::{InvalidEntry, MissingEntry, RankedEntry, ScreenReport};
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::info;

use crate::error::CliError;

pub const RANKED_FILE: &str = "greenblatt_results.csv";
pub const MISSING_FILE: &str = "missing_tickers.csv";
pub const INVALID_FILE: &str = "invalid_tickers.csv";

const RANKED_HEADER: [&str; 12] = [
    "position",
    "ticker",
    "rotc_pct",
    "earnings_yield_pct",
    "ev_ebit",
    "payback_years",
    "rank_earnings_yield",
    "rank_rotc",
    "magic_score",
    "ebit",
    "enterprise_value",
    "tangible_capital",
];
const EXCLUDED_HEADER: [&str; 2] = ["ticker", "reason"];

/// Paths of the files written for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportFiles {
    pub ranked: PathBuf,
    pub missing: PathBuf,
    pub invalid: PathBuf,
}

#[derive(Debug, Serialize)]
struct RankedRow<'a> {
    position: usize,
    ticker: &'a str,
    rotc_pct: f64,
    earnings_yield_pct: f64,
    ev_ebit: f64,
    payback_years: f64,
    rank_earnings_yield: f64,
    rank_rotc: f64,
    magic_score: f64,
    ebit: f64,
    enterprise_value: f64,
    tangible_capital: f64,
}

impl<'a> From<&'a RankedEntry> for RankedRow<'a> {
    fn from(entry: &'a RankedEntry) -> Self {
        let record = &entry.record;
        Self {
            position: entry.position,
            ticker: record.ticker.as_str(),
            rotc_pct: round2(record.rotc_pct()),
            earnings_yield_pct: round2(record.earnings_yield_pct()),
            ev_ebit: round2(record.ev_to_ebit),
            payback_years: round2(record.payback_years),
            rank_earnings_yield: entry.rank_earnings_yield,
            rank_rotc: entry.rank_rotc,
            magic_score: entry.magic_score,
            ebit: record.ebit,
            enterprise_value: record.enterprise_value,
            tangible_capital: record.tangible_capital,
        }
    }
}

#[derive(Debug, Serialize)]
struct ExcludedRow<'a> {
    ticker: &'a str,
    reason: &'a str,
}

impl<'a> From<&'a MissingEntry> for ExcludedRow<'a> {
    fn from(entry: &'a MissingEntry) -> Self {
        Self {
            ticker: entry.ticker.as_str(),
            reason: &entry.reason,
        }
    }
}

impl<'a> From<&'a InvalidEntry> for ExcludedRow<'a> {
    fn from(entry: &'a InvalidEntry) -> Self {
        Self {
            ticker: entry.ticker.as_str(),
            reason: &entry.reason,
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Creates `dir` if needed and proves a file can be written there.
pub fn ensure_writable(dir: &Path) -> Result<(), CliError> {
    let output_dir_error = |source| CliError::OutputDir {
        path: dir.to_path_buf(),
        source,
    };
    fs::create_dir_all(dir).map_err(output_dir_error)?;
    NamedTempFile::new_in(dir).map_err(output_dir_error)?;
    Ok(())
}

pub fn write_report(dir: &Path, report: &ScreenReport) -> Result<ReportFiles, CliError> {
    let files = ReportFiles {
        ranked: dir.join(RANKED_FILE),
        missing: dir.join(MISSING_FILE),
        invalid: dir.join(INVALID_FILE),
    };

    write_rows(
        &files.ranked,
        &RANKED_HEADER,
        report.ranked().iter().map(RankedRow::from),
    )?;
    write_rows(
        &files.missing,
        &EXCLUDED_HEADER,
        report.missing().iter().map(ExcludedRow::from),
    )?;
    write_rows(
        &files.invalid,
        &EXCLUDED_HEADER,
        report.invalid().iter().map(ExcludedRow::from),
    )?;

    info!(
        dir = %dir.display(),
        ranked = report.ranked().len(),
        missing = report.missing().len(),
        invalid = report.invalid().len(),
        "reports written"
    );
    Ok(files)
}

fn write_rows<R: Serialize>(
    path: &Path,
    header: &[&str],
    rows: impl Iterator<Item = R>,
) -> Result<(), CliError> {
    let dir = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut staged = NamedTempFile::new_in(dir)?;
    {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(staged.as_file_mut());
        writer.write_record(header)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
    }
    staged.persist(path).map_err(|error| CliError::Io(error.error))?;
    Ok(())
}
