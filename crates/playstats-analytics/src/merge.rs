//! Joins the two retrieved collections into activity records.

use playstats_common::{ActivityRecord, CategorizedEntry, ItemId, RecentEntry};
use std::collections::{hash_map::Entry, HashMap};
use tracing::debug;

/// Both views of one account's activity, each in its source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergedCollections {
    /// Items of the recent collection, all-time fields filled from the full
    /// collection when the item appears there.
    pub recent: Vec<ActivityRecord>,
    /// Items of the full collection, recent minutes filled from the recent
    /// collection when the item appears there.
    pub all_time: Vec<ActivityRecord>,
}

/// Merges the collections by item id.
///
/// An item missing from one collection gets zero for that collection's
/// field; this is never an error. A failed retrieval is passed as an empty
/// slice. When an id repeats within one collection only its first entry is
/// kept, in the output and as the counterpart looked up by the other side.
pub fn merge_collections(recent: &[RecentEntry], full: &[CategorizedEntry]) -> MergedCollections {
    let (recent, recent_by_id) = first_occurrences(recent, |e| &e.id);
    let (full, full_by_id) = first_occurrences(full, |e| &e.id);

    let recent_records: Vec<ActivityRecord> = recent
        .iter()
        .map(|entry| {
            let record = ActivityRecord::new(entry.id.clone(), entry.label.clone())
                .with_recent_minutes(entry.recent_minutes);
            match full_by_id.get(&entry.id) {
                Some(full_entry) => record
                    .with_total_minutes(full_entry.total_minutes)
                    .with_categories(full_entry.categories.iter().cloned()),
                None => record,
            }
        })
        .collect();

    let all_time_records: Vec<ActivityRecord> = full
        .iter()
        .map(|entry| {
            let recent_minutes = recent_by_id
                .get(&entry.id)
                .map_or(0, |recent_entry| recent_entry.recent_minutes);
            ActivityRecord::new(entry.id.clone(), entry.label.clone())
                .with_recent_minutes(recent_minutes)
                .with_total_minutes(entry.total_minutes)
                .with_categories(entry.categories.iter().cloned())
        })
        .collect();

    debug!(
        recent = recent_records.len(),
        all_time = all_time_records.len(),
        only_recent = recent.iter().filter(|e| !full_by_id.contains_key(&e.id)).count(),
        "Merged activity collections"
    );

    MergedCollections {
        recent: recent_records,
        all_time: all_time_records,
    }
}

/// Keeps the first entry of every id, in source order, plus an index by id.
fn first_occurrences<'a, T>(
    entries: &'a [T],
    id_of: impl Fn(&'a T) -> &'a ItemId,
) -> (Vec<&'a T>, HashMap<&'a ItemId, &'a T>) {
    let mut by_id = HashMap::with_capacity(entries.len());
    let kept: Vec<&T> = entries
        .iter()
        .filter(|&entry| match by_id.entry(id_of(entry)) {
            Entry::Vacant(slot) => {
                slot.insert(entry);
                true
            }
            Entry::Occupied(_) => false,
        })
        .collect();

    if kept.len() < entries.len() {
        debug!(
            dropped = entries.len() - kept.len(),
            "Dropped repeated item ids"
        );
    }
    (kept, by_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use playstats_common::test_utils::record_fixtures;

    #[test]
    fn test_fills_fields_across_collections() {
        let merged = merge_collections(
            &record_fixtures::recent_entries(),
            &record_fixtures::categorized_entries(),
        );

        assert_eq!(merged.recent.len(), 2);
        assert_eq!(merged.all_time.len(), 2);

        let y_recent = &merged.recent[0];
        assert_eq!(y_recent.label, "Y");
        assert_eq!(y_recent.recent_minutes, 95);
        assert_eq!(y_recent.total_minutes, 300);
        assert_eq!(y_recent.categories, vec!["RPG", "Action"]);

        let y_all_time = &merged.all_time[1];
        assert_eq!(y_all_time.recent_minutes, 95);
    }

    #[test]
    fn test_missing_counterpart_is_zero() {
        let merged = merge_collections(
            &record_fixtures::recent_entries(),
            &record_fixtures::categorized_entries(),
        );

        // Z is only in the recent collection, X only in the full one.
        let z = &merged.recent[1];
        assert_eq!(z.label, "Z");
        assert_eq!(z.total_minutes, 0);
        assert!(z.categories.is_empty());

        let x = &merged.all_time[0];
        assert_eq!(x.label, "X");
        assert_eq!(x.recent_minutes, 0);
    }

    #[test]
    fn test_one_side_empty() {
        let merged = merge_collections(&[], &record_fixtures::categorized_entries());
        assert!(merged.recent.is_empty());
        assert_eq!(merged.all_time.len(), 2);

        let merged = merge_collections(&record_fixtures::recent_entries(), &[]);
        assert_eq!(merged.recent.len(), 2);
        assert!(merged.all_time.is_empty());
    }

    #[test]
    fn test_repeated_id_keeps_first_entry() {
        let recent = vec![
            RecentEntry {
                id: ItemId::from(2_u64),
                label: "Y".to_string(),
                recent_minutes: 95,
            },
            RecentEntry {
                id: ItemId::from(2_u64),
                label: "Y again".to_string(),
                recent_minutes: 5,
            },
        ];
        let mut full = record_fixtures::categorized_entries();
        full.push(CategorizedEntry {
            id: ItemId::from(1_u64),
            label: "X again".to_string(),
            total_minutes: 1,
            categories: vec!["Puzzle".to_string()],
        });

        let merged = merge_collections(&recent, &full);

        assert_eq!(merged.recent.len(), 1);
        assert_eq!(merged.recent[0].label, "Y");
        assert_eq!(merged.recent[0].total_minutes, 300);

        assert_eq!(merged.all_time.len(), 2);
        assert_eq!(merged.all_time[0].label, "X");
        assert_eq!(merged.all_time[0].total_minutes, 600);
        assert_eq!(merged.all_time[1].recent_minutes, 95);
    }

    #[test]
    fn test_both_empty() {
        assert_eq!(merge_collections(&[], &[]), MergedCollections::default());
    }
}
