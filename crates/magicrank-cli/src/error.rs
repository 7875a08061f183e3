use std::path::PathBuf;

use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] magicrank_core::ValidationError),

    #[error("cannot read ticker list '{}': {source}", path.display())]
    TickerList {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot load fixtures '{}': {source}", path.display())]
    Fixtures {
        path: PathBuf,
        #[source]
        source: magicrank_core::CoreError,
    },

    #[error("output directory '{}' is not writable: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Core(#[from] magicrank_core::CoreError),

    #[error("strict mode failed: warnings={warning_count}")]
    StrictModeViolation { warning_count: usize },

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::TickerList { .. } => 2,
            Self::Fixtures { .. } => 2,
            Self::Core(_) => 2,
            Self::StrictModeViolation { .. } => 5,
            Self::Serialization(_) => 4,
            Self::OutputDir { .. } => 10,
            Self::Io(_) => 10,
            Self::Csv(_) => 11,
        }
    }
}
