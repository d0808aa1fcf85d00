//! # Location Query Codec
//!
//! Mirrors a list view's filter and page into navigable-location query
//! parameters, and back.
//!
//! ## Rules
//! - Absent values are omitted; nothing is ever written as `"undefined"`,
//!   `"null"` or an empty string.
//! - Unknown keys are ignored on parse.
//! - Malformed values (bad date, negative page) are treated as absent.
//!
//! ```text
//! /water-consumption?endDate=2025-06-30&page=0&startDate=2025-06-01
//!                    └──────────────────┬─────────────────────────┘
//!                                       ▼
//!                     LocationQuery { filter, page: Some(0) }
//! ```

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::filter::EntryFilter;

/// Query parameters of a location, sorted by key.
pub type QueryMap = BTreeMap<String, String>;

pub const START_DATE_KEY: &str = "startDate";
pub const END_DATE_KEY: &str = "endDate";
pub const UNIT_ID_KEY: &str = "unitId";
pub const PAGE_KEY: &str = "page";

/// Filter + page as carried by a location.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationQuery {
    pub filter: EntryFilter,
    /// `None` when the location carries no page parameter.
    pub page: Option<u32>,
}

impl LocationQuery {
    pub fn new(filter: EntryFilter, page: u32) -> Self {
        LocationQuery {
            filter,
            page: Some(page),
        }
    }

    /// Page to fetch; a missing page means the first one.
    pub fn page_or_first(&self) -> u32 {
        self.page.unwrap_or(0)
    }

    /// Parses the recognized keys of `query`.
    pub fn from_query_map(query: &QueryMap) -> Self {
        let filter = EntryFilter {
            start_date: parse_value(query, START_DATE_KEY).and_then(parse_date),
            end_date: parse_value(query, END_DATE_KEY).and_then(parse_date),
            unit_id: parse_value(query, UNIT_ID_KEY).and_then(|v| v.parse().ok()),
        };
        let page = parse_value(query, PAGE_KEY).and_then(|v| v.parse().ok());
        LocationQuery { filter, page }
    }

    /// Writes only the keys that have a value.
    pub fn to_query_map(&self) -> QueryMap {
        let mut query = QueryMap::new();
        if let Some(start) = self.filter.start_date {
            query.insert(START_DATE_KEY.to_string(), start.to_string());
        }
        if let Some(end) = self.filter.end_date {
            query.insert(END_DATE_KEY.to_string(), end.to_string());
        }
        if let Some(unit) = self.filter.unit_id {
            query.insert(UNIT_ID_KEY.to_string(), unit.to_string());
        }
        if let Some(page) = self.page {
            query.insert(PAGE_KEY.to_string(), page.to_string());
        }
        query
    }
}

fn parse_value<'a>(query: &'a QueryMap, key: &str) -> Option<&'a str> {
    query
        .get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty() && *v != "undefined" && *v != "null")
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// Parses `a=1&b=2` (with or without a leading `?`). Later duplicates win.
pub fn parse_query_string(raw: &str) -> QueryMap {
    let raw = raw.strip_prefix('?').unwrap_or(raw);
    serde_urlencoded::from_str::<Vec<(String, String)>>(raw)
        .map(|pairs| pairs.into_iter().collect())
        .unwrap_or_default()
}

/// Encodes a query map as `a=1&b=2`, keys in sorted order.
pub fn to_query_string(query: &QueryMap) -> String {
    serde_urlencoded::to_string(query).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> QueryMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_round_trip_recognized_keys() {
        let query = map(&[
            ("startDate", "2025-06-01"),
            ("endDate", "2025-06-30"),
            ("unitId", "4"),
            ("page", "2"),
        ]);
        let parsed = LocationQuery::from_query_map(&query);
        assert_eq!(parsed.to_query_map(), query);
    }

    #[test]
    fn test_absent_keys_stay_absent() {
        let query = map(&[("endDate", "2025-06-30")]);
        let parsed = LocationQuery::from_query_map(&query);
        assert_eq!(parsed.page, None);
        assert_eq!(parsed.page_or_first(), 0);
        assert_eq!(parsed.to_query_map(), query);
    }

    #[test]
    fn test_undefined_and_garbage_ignored() {
        let query = map(&[
            ("startDate", "undefined"),
            ("endDate", "not-a-date"),
            ("page", "-1"),
            ("sort", "asc"),
        ]);
        let parsed = LocationQuery::from_query_map(&query);
        assert_eq!(parsed, LocationQuery::default());
        assert!(parsed.to_query_map().is_empty());
    }

    #[test]
    fn test_query_string_helpers() {
        let query = parse_query_string("?page=1&startDate=2025-06-01");
        assert_eq!(query.get("page").map(String::as_str), Some("1"));
        assert_eq!(to_query_string(&query), "page=1&startDate=2025-06-01");
        assert!(parse_query_string("").is_empty());
    }
}
