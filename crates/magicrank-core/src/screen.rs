//! Purity filter and Magic Formula metric calculation.

use thiserror::Error;

use crate::data_source::{FetchErrorKind, FetchOutcome};
use crate::{Classification, OutlierScreens, RawFundamentals, ScoredRecord, Ticker};

/// Magnitudes below this are treated as zero.
pub const EPSILON: f64 = 1e-9;

/// Reason a ticker with complete data is excluded from ranking.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PurityViolation {
    #[error("{field} must be positive (got {value})")]
    NonPositive { field: &'static str, value: f64 },
    #[error("{field} is not a finite number")]
    NonFinite { field: &'static str },
    #[error("{field} {value} must be greater than {min}")]
    AtOrBelowFloor {
        field: &'static str,
        value: f64,
        min: f64,
    },
    #[error("{field} {value} must be less than {max}")]
    AtOrAboveCeiling {
        field: &'static str,
        value: f64,
        max: f64,
    },
}

/// Classifies one fetch outcome into exactly one bucket.
pub fn classify(ticker: &Ticker, outcome: FetchOutcome, screens: &OutlierScreens) -> Classification {
    match outcome {
        Ok(raw) => classify_fundamentals(&raw, screens),
        Err(error) => match error.kind() {
            FetchErrorKind::NotFound => {
                Classification::invalid(ticker.clone(), "ticker not recognised by provider")
            }
            FetchErrorKind::IncompleteData | FetchErrorKind::Provider(_) => {
                Classification::missing(ticker.clone(), error.to_string())
            }
        },
    }
}

/// Applies the purity filter and outlier screens to fetched fundamentals.
pub fn classify_fundamentals(raw: &RawFundamentals, screens: &OutlierScreens) -> Classification {
    let ticker = raw.ticker.clone();
    let mut absent = Vec::new();
    let ebit = raw.ebit;
    let enterprise_value = raw.enterprise_value();
    let tangible_capital = raw.tangible_capital();
    if ebit.is_none() {
        absent.push("ebit");
    }
    if enterprise_value.is_none() {
        absent.push("enterprise value");
    }
    if tangible_capital.is_none() {
        absent.push("tangible capital");
    }

    let (Some(ebit), Some(enterprise_value), Some(tangible_capital)) =
        (ebit, enterprise_value, tangible_capital)
    else {
        return Classification::missing(ticker, format!("missing {}", absent.join(", ")));
    };

    match score(ticker.clone(), ebit, enterprise_value, tangible_capital, screens) {
        Ok(record) => Classification::Valid(record),
        Err(violation) => Classification::invalid(ticker, violation.to_string()),
    }
}

/// Computes the scored record, or the first purity condition that fails.
pub fn score(
    ticker: Ticker,
    ebit: f64,
    enterprise_value: f64,
    tangible_capital: f64,
    screens: &OutlierScreens,
) -> Result<ScoredRecord, PurityViolation> {
    let ebit = positive("ebit", ebit)?;
    let enterprise_value = positive("enterprise value", enterprise_value)?;
    let tangible_capital = positive("tangible capital", tangible_capital)?;

    let earnings_yield = finite("earnings yield", ebit / enterprise_value)?;
    let rotc = finite("rotc", ebit / tangible_capital)?;
    let ev_to_ebit = finite("ev/ebit", enterprise_value / ebit)?;

    if let Some(min) = screens.min_tangible_capital {
        if tangible_capital <= min {
            return Err(PurityViolation::AtOrBelowFloor {
                field: "tangible capital",
                value: tangible_capital,
                min,
            });
        }
    }
    if let Some(max) = screens.max_rotc {
        if rotc >= max {
            return Err(PurityViolation::AtOrAboveCeiling {
                field: "rotc",
                value: rotc,
                max,
            });
        }
    }
    if let Some(max) = screens.max_earnings_yield {
        if earnings_yield >= max {
            return Err(PurityViolation::AtOrAboveCeiling {
                field: "earnings yield",
                value: earnings_yield,
                max,
            });
        }
    }

    Ok(ScoredRecord {
        ticker,
        ebit,
        enterprise_value,
        tangible_capital,
        earnings_yield,
        rotc,
        ev_to_ebit,
        payback_years: ev_to_ebit,
    })
}

fn positive(field: &'static str, value: f64) -> Result<f64, PurityViolation> {
    let value = finite(field, value)?;
    if value < EPSILON {
        return Err(PurityViolation::NonPositive { field, value });
    }
    Ok(value)
}

fn finite(field: &'static str, value: f64) -> Result<f64, PurityViolation> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(PurityViolation::NonFinite { field })
    }
}
