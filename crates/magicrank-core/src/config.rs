use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::retry::{Backoff, RetryPolicy};
use crate::{Exchange, ValidationError};

/// Optional sanity screens applied after the purity filter.
///
/// All screens are disabled by default. Bounds are exclusive: a record is
/// kept only when tangible capital is strictly above the floor and ROTC and
/// earnings yield are strictly below their ceilings.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OutlierScreens {
    pub min_tangible_capital: Option<f64>,
    pub max_rotc: Option<f64>,
    pub max_earnings_yield: Option<f64>,
}

impl OutlierScreens {
    /// Tangible capital above 1e6, ROTC below 2.0, earnings yield below 1.0.
    pub const fn classic() -> Self {
        Self {
            min_tangible_capital: Some(1_000_000.0),
            max_rotc: Some(2.0),
            max_earnings_yield: Some(1.0),
        }
    }
}

/// Options consumed by a screening run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenConfig {
    /// Upper bound on simultaneously outstanding fetches.
    pub max_concurrency: usize,
    /// Minimum spacing between fetch dispatches.
    pub request_delay: Duration,
    /// Extra random delay of up to this much after each dispatch slot.
    pub request_jitter: Duration,
    /// Budget for the whole fetch phase.
    pub run_timeout: Duration,
    /// Retries for rate-limited fetches.
    pub max_retries: u32,
    pub retry_base_delay: Duration,
    pub retry_max_delay: Duration,
    /// Exchange assumed for bare symbols in the ticker list.
    pub default_exchange: Exchange,
    pub outliers: OutlierScreens,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 5,
            request_delay: Duration::from_millis(100),
            request_jitter: Duration::ZERO,
            run_timeout: Duration::from_secs(300),
            max_retries: 2,
            retry_base_delay: Duration::from_millis(500),
            retry_max_delay: Duration::from_secs(8),
            default_exchange: Exchange::Lse,
            outliers: OutlierScreens::default(),
        }
    }
}

impl ScreenConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_concurrency == 0 {
            return Err(ValidationError::NonPositiveConfig {
                field: "max_concurrency",
            });
        }
        if self.run_timeout.is_zero() {
            return Err(ValidationError::NonPositiveConfig {
                field: "run_timeout",
            });
        }

        let thresholds = [
            ("min_tangible_capital", self.outliers.min_tangible_capital),
            ("max_rotc", self.outliers.max_rotc),
            ("max_earnings_yield", self.outliers.max_earnings_yield),
        ];
        for (field, value) in thresholds {
            if value.is_some_and(|value| !value.is_finite() || value < 0.0) {
                return Err(ValidationError::InvalidThreshold { field });
            }
        }

        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            backoff: Backoff::Exponential {
                base: self.retry_base_delay,
                factor: 2.0,
                max: self.retry_max_delay,
                jitter: true,
            },
        }
    }
}
