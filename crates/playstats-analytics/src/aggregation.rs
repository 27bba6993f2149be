//! Category distribution and total playtime over a record collection.

use crate::format::{format, DisplayMode, FormattedValue};
use playstats_common::ActivityRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Accumulated playtime of one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryAggregate {
    /// Category label, matched case-sensitively.
    pub category: String,
    /// Sum of `total_minutes` over every record carrying the label.
    pub minutes: u64,
    /// Number of records carrying the label.
    pub record_count: usize,
}

impl CategoryAggregate {
    /// Share of `total_minutes` spent in this category, as a percentage.
    ///
    /// A zero total yields 0%.
    pub fn share_of(&self, total_minutes: u64) -> FormattedValue {
        format(self.minutes, DisplayMode::PercentageOf(total_minutes as f64))
    }
}

/// Result of [`aggregate`].
///
/// `total_minutes` counts every record once, while each record adds its
/// full playtime to every one of its categories. The sum over
/// `categories` therefore exceeds `total_minutes` whenever a record has
/// more than one category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDistribution {
    /// Sum of `total_minutes` over all records.
    pub total_minutes: u64,
    /// Aggregates, descending by minutes, ties in first-seen order.
    pub categories: Vec<CategoryAggregate>,
}

/// Builds the category distribution and total playtime of `records`.
///
/// Empty input yields a zero total and no categories.
#[instrument(skip(records), fields(records = records.len()))]
pub fn aggregate(records: &[ActivityRecord]) -> CategoryDistribution {
    let mut total_minutes = 0u64;
    let mut categories: Vec<CategoryAggregate> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in records {
        total_minutes = total_minutes.saturating_add(record.total_minutes);

        for category in &record.categories {
            let slot = *index.entry(category.as_str()).or_insert_with(|| {
                categories.push(CategoryAggregate {
                    category: category.clone(),
                    minutes: 0,
                    record_count: 0,
                });
                categories.len() - 1
            });
            let aggregate = &mut categories[slot];
            aggregate.minutes = aggregate.minutes.saturating_add(record.total_minutes);
            aggregate.record_count += 1;
        }
    }

    // Stable: equal minutes keep first-seen order.
    categories.sort_by(|a, b| b.minutes.cmp(&a.minutes));

    debug!(
        total_minutes,
        categories = categories.len(),
        "Aggregated category distribution"
    );

    CategoryDistribution {
        total_minutes,
        categories,
    }
}
