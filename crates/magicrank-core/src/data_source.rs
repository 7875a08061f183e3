//! Fundamentals source trait and its failure taxonomy.
//!
//! A [`FundamentalsSource`] performs exactly one logical provider call per
//! [`fetch`](FundamentalsSource::fetch) and never retries; retry and pacing
//! belong to the [`FetchCoordinator`](crate::FetchCoordinator).
//!
//! # Failure kinds
//!
//! | Kind | Meaning | Classified as |
//! |------|---------|---------------|
//! | [`FetchErrorKind::NotFound`] | Ticker unrecognised by the provider | invalid |
//! | [`FetchErrorKind::IncompleteData`] | Statements missing or empty | missing data |
//! | [`FetchErrorKind::Provider`] | Transport, status, rate limit or timeout | missing data |

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use crate::{RawFundamentals, Ticker};

/// Cause of a provider-level failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderFailure {
    Unavailable,
    RateLimited,
    Timeout,
}

/// Fetch failure classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchErrorKind {
    NotFound,
    IncompleteData,
    Provider(ProviderFailure),
}

/// Structured per-ticker fetch error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    kind: FetchErrorKind,
    message: String,
}

impl FetchError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::NotFound,
            message: message.into(),
        }
    }

    pub fn incomplete(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::IncompleteData,
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::Provider(ProviderFailure::Unavailable),
            message: message.into(),
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::Provider(ProviderFailure::RateLimited),
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::Provider(ProviderFailure::Timeout),
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> FetchErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Only rate-limit responses are worth retrying within a run.
    pub const fn retryable(&self) -> bool {
        matches!(
            self.kind,
            FetchErrorKind::Provider(ProviderFailure::RateLimited)
        )
    }

    pub const fn is_provider_error(&self) -> bool {
        matches!(self.kind, FetchErrorKind::Provider(_))
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            FetchErrorKind::NotFound => "fetch.not_found",
            FetchErrorKind::IncompleteData => "fetch.incomplete_data",
            FetchErrorKind::Provider(ProviderFailure::Unavailable) => "fetch.provider_unavailable",
            FetchErrorKind::Provider(ProviderFailure::RateLimited) => "fetch.rate_limited",
            FetchErrorKind::Provider(ProviderFailure::Timeout) => "fetch.timeout",
        }
    }
}

impl Display for FetchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for FetchError {}

/// Result of one fetch attempt.
pub type FetchOutcome = Result<RawFundamentals, FetchError>;

/// Provider adapter contract.
///
/// Implementations must be `Send + Sync`; the coordinator shares one instance
/// across all workers of a run.
pub trait FundamentalsSource: Send + Sync {
    /// Short provider name used in logs and report metadata.
    fn name(&self) -> &'static str;

    /// Fetch statement fields for one ticker.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] when the ticker is unknown, the statements are
    /// empty, or the provider could not be reached.
    fn fetch<'a>(
        &'a self,
        ticker: &'a Ticker,
    ) -> Pin<Box<dyn Future<Output = FetchOutcome> + Send + 'a>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_rate_limits_are_retryable() {
        assert!(FetchError::rate_limited("429").retryable());
        assert!(!FetchError::unavailable("503").retryable());
        assert!(!FetchError::timeout("deadline").retryable());
        assert!(!FetchError::not_found("404").retryable());
    }

    #[test]
    fn display_includes_code() {
        let error = FetchError::incomplete("balance sheet is empty");
        assert_eq!(
            error.to_string(),
            "balance sheet is empty (fetch.incomplete_data)"
        );
    }
}
