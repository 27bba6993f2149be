//! "Most played" selection.

use playstats_common::ActivityRecord;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;

/// Magnitude a ranking is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankBy {
    /// `recent_minutes`
    Recent,
    /// `total_minutes`
    Total,
}

impl RankBy {
    /// Reads the ranked magnitude off a record.
    pub const fn minutes_of(self, record: &ActivityRecord) -> u64 {
        match self {
            Self::Recent => record.recent_minutes,
            Self::Total => record.total_minutes,
        }
    }
}

/// Selects the `n` records with the largest `by` magnitude.
///
/// The result is a new vector sorted descending; records with equal
/// magnitude keep their input order. Fewer than `n` inputs are returned
/// in full without padding.
pub fn top_n(records: &[ActivityRecord], by: RankBy, n: NonZeroUsize) -> Vec<ActivityRecord> {
    let mut ranked: Vec<&ActivityRecord> = records.iter().collect();
    ranked.sort_by(|a, b| by.minutes_of(b).cmp(&by.minutes_of(a)));
    ranked.into_iter().take(n.get()).cloned().collect()
}
