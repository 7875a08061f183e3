use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ranking::{rank, RankedResult};
use crate::{Classification, InvalidEntry, MissingEntry, Ticker};

/// The three disjoint result sets of a run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Partition {
    pub ranked: RankedResult,
    /// Ordered by ticker.
    pub missing: Vec<MissingEntry>,
    /// Ordered by ticker.
    pub invalid: Vec<InvalidEntry>,
}

impl Partition {
    pub fn total(&self) -> usize {
        self.ranked.len() + self.missing.len() + self.invalid.len()
    }

    /// Every ticker across the three sets, ranked first.
    pub fn tickers(&self) -> impl Iterator<Item = &Ticker> {
        self.ranked
            .iter()
            .map(|entry| &entry.record.ticker)
            .chain(self.missing.iter().map(|entry| &entry.ticker))
            .chain(self.invalid.iter().map(|entry| &entry.ticker))
    }

    /// True when the sets cover `input` exactly once each and nothing else.
    pub fn is_partition_of(&self, input: &[Ticker]) -> bool {
        let mut seen = self.tickers().collect::<Vec<_>>();
        seen.sort();
        let mut expected = input.iter().collect::<Vec<_>>();
        expected.sort();
        seen == expected
    }
}

/// Splits classified tickers into ranked, missing and invalid sets.
pub fn partition(classifications: impl IntoIterator<Item = Classification>) -> Partition {
    let mut valid = Vec::new();
    let mut missing = Vec::new();
    let mut invalid = Vec::new();

    for classification in classifications {
        match classification {
            Classification::Valid(record) => valid.push(record),
            Classification::MissingData(entry) => missing.push(entry),
            Classification::Invalid(entry) => invalid.push(entry),
        }
    }

    missing.sort_by(|left, right| left.ticker.cmp(&right.ticker));
    invalid.sort_by(|left, right| left.ticker.cmp(&right.ticker));

    Partition {
        ranked: rank(valid),
        missing,
        invalid,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunCounts {
    pub requested: usize,
    pub ranked: usize,
    pub missing: usize,
    pub invalid: usize,
}

/// Metadata attached to every report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub run_id: Uuid,
    /// RFC 3339, UTC.
    pub started_at: String,
    pub elapsed_ms: u64,
    pub source: String,
    pub timed_out: bool,
    pub counts: RunCounts,
}

/// Outcome of one screening run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenReport {
    pub meta: RunMetadata,
    #[serde(flatten)]
    pub results: Partition,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl ScreenReport {
    pub fn ranked(&self) -> &RankedResult {
        &self.results.ranked
    }

    pub fn missing(&self) -> &[MissingEntry] {
        &self.results.missing
    }

    pub fn invalid(&self) -> &[InvalidEntry] {
        &self.results.invalid
    }
}
