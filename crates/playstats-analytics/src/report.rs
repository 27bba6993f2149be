//! Render-ready view of a committed snapshot.

use crate::{
    format::{format, DisplayMode, FormattedValue},
    snapshot::{CycleStatus, Snapshot, StatsState},
};
use chrono::{DateTime, Utc};
use playstats_common::{AccountId, ActivityRecord, DisplayUnit};
use serde::Serialize;

/// A list that is either populated or explicitly empty.
///
/// Presenters render [`ReportSection::NoData`] as a placeholder.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "entries", rename_all = "snake_case")]
pub enum ReportSection<T> {
    /// At least one entry.
    Entries(Vec<T>),
    /// Nothing to show.
    NoData,
}

impl<T> ReportSection<T> {
    fn from_vec(entries: Vec<T>) -> Self {
        if entries.is_empty() {
            Self::NoData
        } else {
            Self::Entries(entries)
        }
    }

    /// Entries, empty for a placeholder section.
    pub fn entries(&self) -> &[T] {
        match self {
            Self::Entries(entries) => entries,
            Self::NoData => &[],
        }
    }

    /// Whether this section renders as a placeholder.
    pub const fn is_no_data(&self) -> bool {
        matches!(self, Self::NoData)
    }
}

/// One ranked item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry {
    /// 1-based position.
    pub rank: usize,
    /// Item name.
    pub label: String,
    /// Ranked magnitude in the display unit.
    pub value: FormattedValue,
}

/// One category of the distribution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryEntry {
    /// Category label.
    pub category: String,
    /// Accumulated playtime in the display unit.
    pub value: FormattedValue,
    /// Accumulated playtime as a percentage of total playtime.
    pub share: FormattedValue,
    /// Number of items carrying the category.
    pub record_count: usize,
}

/// Formatted analytics for one published state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityReport {
    /// Identifier the data belongs to.
    pub identifier: Option<AccountId>,
    /// Generation of the snapshot.
    pub generation: u64,
    /// When the cycle that produced the snapshot committed.
    pub completed_at: Option<DateTime<Utc>>,
    /// Status the snapshot was published with.
    pub status: CycleStatus,
    /// Unit every magnitude is expressed in.
    pub unit: DisplayUnit,
    /// Total playtime over the all-time collection.
    pub total: FormattedValue,
    /// Most played recently.
    pub recent: ReportSection<RankedEntry>,
    /// Most played all-time.
    pub all_time: ReportSection<RankedEntry>,
    /// Category distribution, descending by playtime.
    pub categories: ReportSection<CategoryEntry>,
}

impl ActivityReport {
    /// Formats a published state.
    pub fn from_state(state: &StatsState, unit: DisplayUnit) -> Self {
        Self::build(&state.snapshot, state.status.clone(), unit)
    }

    /// Formats a snapshot.
    ///
    /// In percentage mode the all-time ranking, the total and the categories
    /// are relative to total playtime, while the recent ranking is relative
    /// to the recent minutes of the ranked items.
    pub fn build(snapshot: &Snapshot, status: CycleStatus, unit: DisplayUnit) -> Self {
        let total_mode = DisplayMode::from_unit(unit, snapshot.total_minutes as f64);
        let recent_sum: u64 = snapshot.recent.iter().map(|r| r.recent_minutes).sum();
        let recent_mode = DisplayMode::from_unit(unit, recent_sum as f64);

        let categories = snapshot
            .categories
            .iter()
            .map(|aggregate| CategoryEntry {
                category: aggregate.category.clone(),
                value: format(aggregate.minutes, total_mode),
                share: aggregate.share_of(snapshot.total_minutes),
                record_count: aggregate.record_count,
            })
            .collect();

        Self {
            identifier: snapshot.identifier.clone(),
            generation: snapshot.generation,
            completed_at: snapshot.completed_at,
            status,
            unit,
            total: format(snapshot.total_minutes, total_mode),
            recent: ReportSection::from_vec(ranked(
                &snapshot.recent,
                |r| r.recent_minutes,
                recent_mode,
            )),
            all_time: ReportSection::from_vec(ranked(
                &snapshot.all_time,
                |r| r.total_minutes,
                total_mode,
            )),
            categories: ReportSection::from_vec(categories),
        }
    }

    /// Whether every section is a placeholder.
    pub const fn has_no_data(&self) -> bool {
        self.recent.is_no_data() && self.all_time.is_no_data() && self.categories.is_no_data()
    }

    /// Whether the snapshot came from a cycle with a failed retrieval.
    pub const fn is_partial(&self) -> bool {
        self.status.is_failed()
    }
}

fn ranked(
    records: &[ActivityRecord],
    minutes_of: impl Fn(&ActivityRecord) -> u64,
    mode: DisplayMode,
) -> Vec<RankedEntry> {
    records
        .iter()
        .enumerate()
        .map(|(i, record)| RankedEntry {
            rank: i + 1,
            label: record.label.clone(),
            value: format(minutes_of(record), mode),
        })
        .collect()
}
