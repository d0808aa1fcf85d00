//! # Recent Activity Merge
//!
//! Pure half of the cross-category activity feed: tag entries with their
//! category and normalized date, then merge the batches newest-first.
//!
//! Sorting is stable, so entries sharing a date keep the order they arrived
//! in (category order first, then the server's order within a category).

use chrono::NaiveDate;
use serde::Serialize;
use ts_rs::TS;

use crate::types::{Category, Entry};

/// One row of the unified recent-activity feed.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ActivityItem {
    pub category: Category,

    /// Display label, e.g. "Water Consumption".
    pub label: String,

    #[ts(as = "String")]
    pub date: NaiveDate,

    pub entry_id: Option<i64>,

    pub submitted_by: Option<String>,

    /// The full entry, for detail views.
    #[ts(type = "unknown")]
    pub entry: serde_json::Value,
}

impl ActivityItem {
    pub fn from_entry<E: Entry>(entry: &E) -> Self {
        ActivityItem {
            category: E::CATEGORY,
            label: E::CATEGORY.label().to_string(),
            date: entry.normalized_date(),
            entry_id: entry.id(),
            submitted_by: entry.submitted_by().map(str::to_string),
            entry: serde_json::to_value(entry).unwrap_or_default(),
        }
    }
}

/// Tags a batch of entries of one category.
pub fn tag_entries<E: Entry>(entries: &[E]) -> Vec<ActivityItem> {
    entries.iter().map(ActivityItem::from_entry).collect()
}

/// Concatenates `batches`, sorts by date descending and keeps `limit` items.
pub fn merge_recent(batches: Vec<Vec<ActivityItem>>, limit: usize) -> Vec<ActivityItem> {
    let mut merged: Vec<ActivityItem> = batches.into_iter().flatten().collect();
    merged.sort_by(|a, b| b.date.cmp(&a.date));
    merged.truncate(limit);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{VehicleEntry, WasteEntry};

    fn vehicle(id: i64, day: u32) -> VehicleEntry {
        VehicleEntry {
            id: Some(id),
            entry_date: NaiveDate::from_ymd_opt(2025, 7, day).unwrap(),
            public_transport_count: 150,
            private_vehicle_count: 800,
            zev_count: 50,
            unit_id: None,
            unit_name: None,
            submitted_by: Some("security_user1".into()),
        }
    }

    fn waste(id: i64, day: u32) -> WasteEntry {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "dataDate": format!("2025-07-{:02}", day),
            "submittedByUsername": "yemekhane_user1"
        }))
        .unwrap()
    }

    #[test]
    fn test_tagging_uses_category_label() {
        let items = tag_entries(&[vehicle(1, 3)]);
        assert_eq!(items[0].category, Category::Vehicle);
        assert_eq!(items[0].label, "Vehicle Entry");
        assert_eq!(items[0].submitted_by.as_deref(), Some("security_user1"));
        assert_eq!(items[0].entry["entryDate"], "2025-07-03");
    }

    #[test]
    fn test_merge_sorts_descending_and_truncates() {
        let merged = merge_recent(
            vec![
                tag_entries(&[vehicle(1, 3), vehicle(2, 10)]),
                tag_entries(&[waste(1, 7), waste(2, 12), waste(3, 1)]),
            ],
            3,
        );
        let days: Vec<u32> = merged
            .iter()
            .map(|i| chrono::Datelike::day(&i.date))
            .collect();
        assert_eq!(days, vec![12, 10, 7]);
    }

    #[test]
    fn test_ties_keep_batch_order() {
        let merged = merge_recent(
            vec![tag_entries(&[vehicle(1, 5)]), tag_entries(&[waste(9, 5)])],
            5,
        );
        assert_eq!(merged[0].category, Category::Vehicle);
        assert_eq!(merged[1].category, Category::Waste);
    }

    #[test]
    fn test_merge_of_nothing_is_empty() {
        assert!(merge_recent(vec![vec![], vec![]], 5).is_empty());
    }
}
