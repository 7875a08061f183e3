use thiserror::Error;

/// Validation and contract errors exposed by `magicrank-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("ticker cannot be empty")]
    EmptyTicker,
    #[error("ticker '{value}' length {len} exceeds max {max}")]
    TickerTooLong { value: String, len: usize, max: usize },
    #[error("ticker '{value}' must start with an ASCII letter or digit")]
    TickerInvalidStart { value: String },
    #[error("ticker '{value}' contains invalid character '{ch}' at index {index}")]
    TickerInvalidChar { value: String, ch: char, index: usize },
    #[error("unknown exchange prefix '{exchange}' in '{value}'")]
    UnknownExchange { exchange: String, value: String },
    #[error("'{value}' carries a suffix that does not belong to {exchange} (expected .{expected})")]
    ExchangeSuffixMismatch {
        exchange: String,
        expected: &'static str,
        value: String,
    },

    #[error("ticker list is empty")]
    EmptyTickerList,

    #[error("config field '{field}' must be greater than zero")]
    NonPositiveConfig { field: &'static str },
    #[error("config field '{field}' must be finite and non-negative")]
    InvalidThreshold { field: &'static str },
}

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("fixture file error: {0}")]
    Io(#[from] std::io::Error),
}
