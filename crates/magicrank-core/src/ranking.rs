//! Magic Formula dual ranking.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::{ScoredRecord, Ticker};

/// One ranked row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEntry {
    /// 1-based position in the final ordering.
    pub position: usize,
    pub record: ScoredRecord,
    /// Rank by earnings yield, 1 = highest. Ties share the average rank.
    pub rank_earnings_yield: f64,
    /// Rank by ROTC, 1 = highest. Ties share the average rank.
    pub rank_rotc: f64,
    /// `rank_earnings_yield + rank_rotc`; lower is better.
    pub magic_score: f64,
}

/// Immutable, totally ordered ranking of valid records.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RankedResult {
    entries: Vec<RankedEntry>,
}

impl RankedResult {
    pub fn entries(&self) -> &[RankedEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RankedEntry> {
        self.entries.iter()
    }

    pub fn tickers(&self) -> Vec<&Ticker> {
        self.entries.iter().map(|entry| &entry.record.ticker).collect()
    }
}

impl<'a> IntoIterator for &'a RankedResult {
    type Item = &'a RankedEntry;
    type IntoIter = std::slice::Iter<'a, RankedEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Ranks records by combined earnings-yield and ROTC rank.
///
/// Ordering is by magic score ascending, then earnings-yield rank ascending,
/// then ticker ascending, so the result does not depend on input order.
pub fn rank(records: Vec<ScoredRecord>) -> RankedResult {
    let yields = records
        .iter()
        .map(|record| record.earnings_yield)
        .collect::<Vec<_>>();
    let returns = records.iter().map(|record| record.rotc).collect::<Vec<_>>();
    let yield_ranks = descending_average_ranks(&yields);
    let rotc_ranks = descending_average_ranks(&returns);

    let mut entries = records
        .into_iter()
        .zip(yield_ranks.into_iter().zip(rotc_ranks))
        .map(|(record, (rank_earnings_yield, rank_rotc))| RankedEntry {
            position: 0,
            record,
            rank_earnings_yield,
            rank_rotc,
            magic_score: rank_earnings_yield + rank_rotc,
        })
        .collect::<Vec<_>>();

    entries.sort_by(compare_entries);
    for (index, entry) in entries.iter_mut().enumerate() {
        entry.position = index + 1;
    }

    RankedResult { entries }
}

fn compare_entries(left: &RankedEntry, right: &RankedEntry) -> Ordering {
    left.magic_score
        .total_cmp(&right.magic_score)
        .then_with(|| left.rank_earnings_yield.total_cmp(&right.rank_earnings_yield))
        .then_with(|| left.record.ticker.cmp(&right.record.ticker))
}

/// 1-based descending ranks; equal values get the mean of the positions they span.
fn descending_average_ranks(values: &[f64]) -> Vec<f64> {
    let mut order = (0..values.len()).collect::<Vec<_>>();
    order.sort_by(|&left, &right| values[right].total_cmp(&values[left]));

    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && values[order[end]] == values[order[start]] {
            end += 1;
        }
        // Positions start+1 ..= end.
        let average = (start + 1 + end) as f64 / 2.0;
        for &index in &order[start..end] {
            ranks[index] = average;
        }
        start = end;
    }
    ranks
}
