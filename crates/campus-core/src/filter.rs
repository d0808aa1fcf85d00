//! # Entry Filters
//!
//! The filter a list view applies to one category, and the request it turns
//! into.
//!
//! ## Role-Based Unit Override
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  UI filter               Principal                 Outgoing request     │
//! │  ─────────               ─────────                 ────────────────     │
//! │  unitId = 3       +      ADMIN                 →   unitId = 3           │
//! │  unitId = 3       +      BUILDING_MANAGER (7)  →   unitId = 7           │
//! │  unitId = None    +      BUILDING_MANAGER (7)  →   unitId = 7           │
//! │  unitId = 3       +      (anonymous)           →   unitId = 3           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! For unit-scoped roles the UI filter is informational only.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::User;
use crate::validation::{validate_date_range, ValidationResult};

/// Date range (inclusive) plus optional organizational-unit selector.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct EntryFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<String>")]
    pub start_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<String>")]
    pub end_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_id: Option<i64>,
}

impl EntryFilter {
    pub fn new(start_date: Option<NaiveDate>, end_date: Option<NaiveDate>) -> Self {
        EntryFilter {
            start_date,
            end_date,
            unit_id: None,
        }
    }

    pub fn with_unit(mut self, unit_id: i64) -> Self {
        self.unit_id = Some(unit_id);
        self
    }

    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.start_date.is_none() && self.end_date.is_none() && self.unit_id.is_none()
    }

    /// Rejects ranges whose start is after their end.
    pub fn validate(&self) -> ValidationResult<()> {
        validate_date_range(self.start_date, self.end_date)
    }

    /// The filter as the server should see it for `principal`.
    ///
    /// A unit-scoped principal's own unit replaces whatever unit the UI
    /// selected.
    pub fn effective_for(&self, principal: Option<&User>) -> EntryFilter {
        let mut effective = self.clone();
        if let Some(unit) = principal.and_then(User::scoped_unit) {
            effective.unit_id = Some(unit);
        }
        effective
    }
}

/// A fully-resolved list request: filter, zero-based page and page size.
///
/// Serializes straight into the API query string; unset filter fields are
/// omitted rather than sent as empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRequest {
    #[serde(flatten)]
    pub filter: EntryFilter,
    pub page: u32,
    pub size: u32,
}

impl ListRequest {
    pub fn new(filter: EntryFilter, page: u32, size: u32) -> Self {
        ListRequest { filter, page, size }
    }

    /// Encodes the request as `startDate=...&page=0&size=10`.
    pub fn to_query_string(&self) -> String {
        // Only strings, integers and dates: encoding cannot fail.
        serde_urlencoded::to_string(self).unwrap_or_default()
    }
}
