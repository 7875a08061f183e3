//! Rate-limit retry policy with exponential backoff and jitter.

use std::time::Duration;

use crate::data_source::FetchError;

/// Backoff strategy between retries of a rate-limited fetch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
    /// Same delay before every retry.
    Fixed { delay: Duration },
    /// `base * factor^attempt`, capped at `max`, optionally jittered by +/- 50%.
    Exponential {
        base: Duration,
        factor: f64,
        max: Duration,
        jitter: bool,
    },
}

impl Default for Backoff {
    fn default() -> Self {
        Self::Exponential {
            base: Duration::from_millis(500),
            factor: 2.0,
            max: Duration::from_secs(8),
            jitter: true,
        }
    }
}

impl Backoff {
    /// Delay before retry number `attempt` (0-based).
    pub fn delay(self, attempt: u32) -> Duration {
        match self {
            Self::Fixed { delay } => delay,
            Self::Exponential {
                base,
                factor,
                max,
                jitter,
            } => {
                let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
                let seconds = base.as_secs_f64() * factor.powi(exponent);
                let capped = Duration::from_secs_f64(seconds.min(max.as_secs_f64()));
                if jitter {
                    jittered(capped)
                } else {
                    capped
                }
            }
        }
    }
}

fn jittered(delay: Duration) -> Duration {
    let half = u64::try_from(delay.as_millis() / 2).unwrap_or(u64::MAX);
    let offset = fastrand::u64(0..=half.saturating_mul(2));
    let millis = u64::try_from(delay.as_millis())
        .unwrap_or(u64::MAX)
        .saturating_sub(half)
        .saturating_add(offset);
    Duration::from_millis(millis)
}

/// Coordinator-level retry settings.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; total attempts = `max_retries + 1`.
    pub max_retries: u32,
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            backoff: Backoff::default(),
        }
    }
}

impl RetryPolicy {
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Returns the wait before the next attempt, or `None` when the error is final.
    pub fn next_delay(&self, error: &FetchError, retries_so_far: u32) -> Option<Duration> {
        if !error.retryable() || retries_so_far >= self.max_retries {
            return None;
        }
        Some(self.backoff.delay(retries_so_far))
    }
}
