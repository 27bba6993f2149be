//! Derived state for one account identifier, and the cycle status around it.

use crate::{
    aggregation::{aggregate, CategoryAggregate},
    merge::merge_collections,
    ranking::{top_n, RankBy},
};
use chrono::{DateTime, Utc};
use playstats_common::{AccountId, ActivityRecord, CategorizedEntry, RecentEntry, RetrievalKind};
use serde::Serialize;
use std::{num::NonZeroUsize, sync::Arc};

/// Complete derived analytics for one identifier.
///
/// Snapshots are immutable once built and are replaced as a whole.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    /// Identifier the data belongs to; `None` for the empty snapshot.
    pub identifier: Option<AccountId>,
    /// Most played in the short window.
    pub recent: Vec<ActivityRecord>,
    /// Most played all-time.
    pub all_time: Vec<ActivityRecord>,
    /// Total playtime over the full collection, each item once.
    pub total_minutes: u64,
    /// Category distribution, descending by minutes.
    pub categories: Vec<CategoryAggregate>,
    /// Cycle that produced this snapshot.
    pub generation: u64,
    /// When the cycle settled; `None` for the empty snapshot.
    pub completed_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    /// The empty snapshot for `generation`.
    pub fn empty(generation: u64) -> Self {
        Self {
            generation,
            ..Self::default()
        }
    }

    /// Derives a snapshot from the raw collections of one cycle.
    ///
    /// A failed retrieval is passed as an empty slice; the other half still
    /// yields its analytics.
    pub fn build(
        identifier: AccountId,
        generation: u64,
        recent: &[RecentEntry],
        full: &[CategorizedEntry],
        limit: NonZeroUsize,
    ) -> Self {
        let merged = merge_collections(recent, full);
        let distribution = aggregate(&merged.all_time);

        Self {
            identifier: Some(identifier),
            recent: top_n(&merged.recent, RankBy::Recent, limit),
            all_time: top_n(&merged.all_time, RankBy::Total, limit),
            total_minutes: distribution.total_minutes,
            categories: distribution.categories,
            generation,
            completed_at: Some(Utc::now()),
        }
    }

    /// Whether every collection is empty, so the presenter shows placeholders.
    pub fn has_no_data(&self) -> bool {
        self.recent.is_empty() && self.all_time.is_empty() && self.categories.is_empty()
    }
}

/// A retrieval of the current cycle that errored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RetrievalFailure {
    /// Which half of the cycle failed.
    pub kind: RetrievalKind,
    /// Rendered error.
    pub message: String,
    /// HTTP status when the source answered with one.
    pub status_code: Option<u16>,
}

/// Orchestrator state machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CycleStatus {
    /// No identifier submitted.
    Idle,
    /// Retrievals of the current generation are outstanding.
    Loading,
    /// Both retrievals succeeded and the snapshot is committed.
    Ready,
    /// At least one retrieval failed; the snapshot holds whatever succeeded.
    Failed {
        /// The failed retrievals.
        failures: Vec<RetrievalFailure>,
    },
}

impl CycleStatus {
    /// Whether a cycle is in flight.
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Whether the last cycle settled with a failure.
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Published pair of status and committed snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsState {
    /// Current cycle status.
    pub status: CycleStatus,
    /// Last committed snapshot.
    pub snapshot: Arc<Snapshot>,
}

impl StatsState {
    /// Idle state with an empty snapshot.
    pub fn idle(generation: u64) -> Self {
        Self {
            status: CycleStatus::Idle,
            snapshot: Arc::new(Snapshot::empty(generation)),
        }
    }
}
