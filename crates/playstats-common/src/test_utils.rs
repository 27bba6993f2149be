//! Test utilities and shared test helpers for PlayStats.
//!
//! Fixtures and helpers used by unit and integration tests across the workspace.

use std::sync::Once;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize test logging once per test run.
static INIT: Once = Once::new();

/// Initialize logging for tests with a sensible default configuration.
/// This function is safe to call multiple times and will only initialize once.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

        let _ = fmt().with_test_writer().with_env_filter(filter).try_init();
    });
}

/// Assert that two floating point numbers are approximately equal within a tolerance.
pub fn assert_approx_eq(left: f64, right: f64, tolerance: f64) {
    let diff = (left - right).abs();
    assert!(
        diff <= tolerance,
        "assertion failed: `{left}` is not approximately equal to `{right}` (tolerance: {tolerance}, diff: {diff})"
    );
}

/// Activity record fixtures.
pub mod record_fixtures {
    use crate::{ActivityRecord, CategorizedEntry, ItemId, RecentEntry};

    /// The two-record library used throughout the aggregation tests:
    /// X (600 min, RPG) and Y (300 min, RPG + Action).
    pub fn rpg_library() -> Vec<ActivityRecord> {
        vec![
            ActivityRecord::new(1_u64, "X")
                .with_total_minutes(600)
                .with_categories(["RPG"]),
            ActivityRecord::new(2_u64, "Y")
                .with_total_minutes(300)
                .with_categories(["RPG", "Action"]),
        ]
    }

    /// A recent-activity collection as the source would return it.
    pub fn recent_entries() -> Vec<RecentEntry> {
        vec![
            RecentEntry {
                id: ItemId::from(2_u64),
                label: "Y".to_string(),
                recent_minutes: 95,
            },
            RecentEntry {
                id: ItemId::from(3_u64),
                label: "Z".to_string(),
                recent_minutes: 40,
            },
        ]
    }

    /// A full-activity collection as the source would return it.
    pub fn categorized_entries() -> Vec<CategorizedEntry> {
        vec![
            CategorizedEntry {
                id: ItemId::from(1_u64),
                label: "X".to_string(),
                total_minutes: 600,
                categories: vec!["RPG".to_string()],
            },
            CategorizedEntry {
                id: ItemId::from(2_u64),
                label: "Y".to_string(),
                total_minutes: 300,
                categories: vec!["RPG".to_string(), "Action".to_string()],
            },
        ]
    }

    /// Records with equal totals, for stability checks.
    pub fn tied_records(count: usize, minutes: u64) -> Vec<ActivityRecord> {
        (0..count)
            .map(|i| {
                ActivityRecord::new(i as u64, format!("tied_{i}"))
                    .with_total_minutes(minutes)
                    .with_recent_minutes(minutes)
            })
            .collect()
    }
}

/// Property-based testing utilities using proptest.
#[cfg(feature = "proptest")]
pub mod property_testing {
    use crate::ActivityRecord;
    use proptest::prelude::*;

    /// Strategy for a single category label from a small alphabet, so
    /// generated records share categories often.
    pub fn category_strategy() -> impl Strategy<Value = String> {
        prop::sample::select(vec!["RPG", "Action", "Indie", "Strategy", "rpg"])
            .prop_map(str::to_string)
    }

    /// Strategy for an activity record with a bounded playtime.
    pub fn record_strategy() -> impl Strategy<Value = ActivityRecord> {
        (
            0u64..10_000,
            "[A-Za-z ]{1,16}",
            0u64..5_000,
            0u64..500_000,
            prop::collection::vec(category_strategy(), 0..4),
        )
            .prop_map(|(id, label, recent, total, categories)| {
                ActivityRecord::new(id, label)
                    .with_recent_minutes(recent)
                    .with_total_minutes(total)
                    .with_categories(categories)
            })
    }

    /// Strategy for a collection of records.
    pub fn records_strategy(max_len: usize) -> impl Strategy<Value = Vec<ActivityRecord>> {
        prop::collection::vec(record_strategy(), 0..max_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_multiple_calls() {
        init_test_logging();
        init_test_logging();
    }

    #[test]
    fn test_assert_approx_eq() {
        assert_approx_eq(1.0, 1.0001, 0.001);
        assert_approx_eq(1.0, 0.9999, 0.001);
    }

    #[test]
    #[should_panic]
    fn test_assert_approx_eq_fails() {
        assert_approx_eq(1.0, 1.1, 0.05);
    }

    #[test]
    fn test_rpg_library_shape() {
        let records = record_fixtures::rpg_library();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].categories, vec!["RPG", "Action"]);
    }
}
