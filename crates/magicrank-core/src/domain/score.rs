use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::Ticker;

/// Screening verdict for one ticker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationTag {
    Valid,
    MissingData,
    Invalid,
}

impl ClassificationTag {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::MissingData => "missing_data",
            Self::Invalid => "invalid",
        }
    }
}

impl Display for ClassificationTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Magic Formula metrics for a ticker that passed the purity filter.
///
/// All ratios are finite and strictly positive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRecord {
    pub ticker: Ticker,
    pub ebit: f64,
    pub enterprise_value: f64,
    pub tangible_capital: f64,
    /// EBIT / EV.
    pub earnings_yield: f64,
    /// EBIT / tangible capital.
    pub rotc: f64,
    /// EV / EBIT.
    pub ev_to_ebit: f64,
    /// Years of EBIT needed to recover EV; equal to `ev_to_ebit`.
    pub payback_years: f64,
}

impl ScoredRecord {
    pub fn earnings_yield_pct(&self) -> f64 {
        self.earnings_yield * 100.0
    }

    pub fn rotc_pct(&self) -> f64 {
        self.rotc * 100.0
    }
}

/// Ticker excluded because the provider returned no usable data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingEntry {
    pub ticker: Ticker,
    pub reason: String,
}

/// Ticker excluded because it is unknown or fails the purity filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidEntry {
    pub ticker: Ticker,
    pub reason: String,
}

/// Classified outcome for a single ticker.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    Valid(ScoredRecord),
    MissingData(MissingEntry),
    Invalid(InvalidEntry),
}

impl Classification {
    pub fn missing(ticker: Ticker, reason: impl Into<String>) -> Self {
        Self::MissingData(MissingEntry {
            ticker,
            reason: reason.into(),
        })
    }

    pub fn invalid(ticker: Ticker, reason: impl Into<String>) -> Self {
        Self::Invalid(InvalidEntry {
            ticker,
            reason: reason.into(),
        })
    }

    pub const fn tag(&self) -> ClassificationTag {
        match self {
            Self::Valid(_) => ClassificationTag::Valid,
            Self::MissingData(_) => ClassificationTag::MissingData,
            Self::Invalid(_) => ClassificationTag::Invalid,
        }
    }
}
