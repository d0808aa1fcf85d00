//! # Domain Types
//!
//! Core domain types used throughout Campus Pulse.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  Entries (one per tracked category, all implement `Entry`)             │
//! │  ┌──────────────┐ ┌──────────────┐ ┌──────────────────┐ ┌────────────┐ │
//! │  │ VehicleEntry │ │ WaterEntry   │ │ ElectricityEntry │ │ WasteEntry │ │
//! │  │ entryDate    │ │ periodEnd    │ │ periodEnd        │ │ dataDate   │ │
//! │  └──────────────┘ └──────────────┘ └──────────────────┘ └────────────┘ │
//! │                                                                         │
//! │  ┌──────────────┐ ┌──────────────┐ ┌──────────────────┐ ┌────────────┐ │
//! │  │   Metric     │ │    User      │ │ ActivityLogEntry │ │  Page<T>   │ │
//! │  │ key/value/   │ │ role +       │ │ who/what/when    │ │ content +  │ │
//! │  │ category     │ │ unit binding │ │                  │ │ cursor     │ │
//! │  └──────────────┘ └──────────────┘ └──────────────────┘ └────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Format
//! The REST API speaks camelCase JSON. Some legacy endpoints still emit
//! snake_case for water entries, so those fields carry aliases.

use chrono::{NaiveDate, NaiveDateTime};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;

use crate::error::CoreError;

// =============================================================================
// Category
// =============================================================================

/// A tracked data category. Each one maps to exactly one REST resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Category {
    Vehicle,
    Water,
    Electricity,
    Waste,
}

impl Category {
    /// All categories, in feed order.
    pub const ALL: [Category; 4] = [
        Category::Vehicle,
        Category::Water,
        Category::Electricity,
        Category::Waste,
    ];

    /// REST resource path relative to the API base.
    pub fn resource_path(&self) -> &'static str {
        match self {
            Category::Vehicle => "/entries/vehicle",
            Category::Water => "/consumption/water",
            Category::Electricity => "/consumption/electricity",
            Category::Waste => "/entries/waste",
        }
    }

    /// Navigable route of the category's list view.
    pub fn route(&self) -> &'static str {
        match self {
            Category::Vehicle => "/vehicle-entries",
            Category::Water => "/water-consumption",
            Category::Electricity => "/electricity-consumption",
            Category::Waste => "/waste-data",
        }
    }

    /// Human-readable label used in the activity feed.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Vehicle => "Vehicle Entry",
            Category::Water => "Water Consumption",
            Category::Electricity => "Electricity Consumption",
            Category::Waste => "Waste Data",
        }
    }

    /// Electricity readings cannot be deleted once submitted.
    pub fn supports_delete(&self) -> bool {
        !matches!(self, Category::Electricity)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Vehicle => write!(f, "vehicle"),
            Category::Water => write!(f, "water"),
            Category::Electricity => write!(f, "electricity"),
            Category::Waste => write!(f, "waste"),
        }
    }
}

impl std::str::FromStr for Category {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "vehicle" | "vehicles" => Ok(Category::Vehicle),
            "water" => Ok(Category::Water),
            "electricity" => Ok(Category::Electricity),
            "waste" => Ok(Category::Waste),
            other => Err(CoreError::UnknownCategory(other.to_string())),
        }
    }
}

// =============================================================================
// Entry Trait
// =============================================================================

/// Common surface of every submitted measurement row.
///
/// `normalized_date` is the single date the activity feed sorts on; for
/// period-based readings it is the end of the period.
pub trait Entry: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// Category this entry type belongs to.
    const CATEGORY: Category;

    /// Server-assigned id (absent before the entry is created).
    fn id(&self) -> Option<i64>;

    /// Date used to order entries across categories.
    fn normalized_date(&self) -> NaiveDate;

    /// Username of whoever submitted the entry.
    fn submitted_by(&self) -> Option<&str>;
}

// =============================================================================
// Vehicle Entry
// =============================================================================

/// Daily vehicle count at the campus entrances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct VehicleEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    #[ts(as = "String")]
    pub entry_date: NaiveDate,

    #[serde(default)]
    pub public_transport_count: i64,

    #[serde(default)]
    pub private_vehicle_count: i64,

    /// Zero-emission vehicles.
    #[serde(default)]
    pub zev_count: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_id: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_by: Option<String>,
}

impl Entry for VehicleEntry {
    const CATEGORY: Category = Category::Vehicle;

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn normalized_date(&self) -> NaiveDate {
        self.entry_date
    }

    fn submitted_by(&self) -> Option<&str> {
        self.submitted_by.as_deref()
    }
}

// =============================================================================
// Water Entry
// =============================================================================

/// Water consumption over a billing period for one unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct WaterEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    #[serde(alias = "period_start_date")]
    #[ts(as = "String")]
    pub period_start_date: NaiveDate,

    #[serde(alias = "period_end_date")]
    #[ts(as = "String")]
    pub period_end_date: NaiveDate,

    #[serde(default, alias = "consumption_ton")]
    pub consumption_ton: f64,

    #[serde(default, alias = "recycled_water_usage_liters")]
    pub recycled_water_usage_liters: f64,

    #[serde(default, alias = "treated_water_consumption_liters")]
    pub treated_water_consumption_liters: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_id: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_by: Option<String>,
}

impl Entry for WaterEntry {
    const CATEGORY: Category = Category::Water;

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn normalized_date(&self) -> NaiveDate {
        self.period_end_date
    }

    fn submitted_by(&self) -> Option<&str> {
        self.submitted_by.as_deref()
    }
}

// =============================================================================
// Electricity Entry
// =============================================================================

/// Electricity consumption over a billing period for one unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ElectricityEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    #[ts(as = "String")]
    pub period_start_date: NaiveDate,

    #[ts(as = "String")]
    pub period_end_date: NaiveDate,

    #[serde(default)]
    pub consumption_kwh: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_id: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_by_username: Option<String>,
}

impl Entry for ElectricityEntry {
    const CATEGORY: Category = Category::Electricity;

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn normalized_date(&self) -> NaiveDate {
        self.period_end_date
    }

    fn submitted_by(&self) -> Option<&str> {
        self.submitted_by_username.as_deref()
    }
}

// =============================================================================
// Waste Entry
// =============================================================================

/// Daily waste production and treatment figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct WasteEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    #[ts(as = "String")]
    pub data_date: NaiveDate,

    #[serde(default)]
    pub organic_production_kg: f64,
    #[serde(default)]
    pub organic_consumption_kg: f64,
    #[serde(default)]
    pub organic_treated_kg: f64,
    #[serde(default)]
    pub inorganic_production_kg: f64,
    #[serde(default)]
    pub inorganic_consumption_kg: f64,
    #[serde(default)]
    pub inorganic_recycled_kg: f64,
    #[serde(default)]
    pub toxic_waste_kg: f64,
    #[serde(default)]
    pub treated_toxic_waste_kg: f64,
    #[serde(default)]
    pub sewage_disposal_liters: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_id: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_by_username: Option<String>,
}

impl Entry for WasteEntry {
    const CATEGORY: Category = Category::Waste;

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn normalized_date(&self) -> NaiveDate {
        self.data_date
    }

    fn submitted_by(&self) -> Option<&str> {
        self.submitted_by_username.as_deref()
    }
}

// =============================================================================
// Users & Units
// =============================================================================

/// Role of an authenticated user.
///
/// Unknown role names from newer servers deserialize to `Other` rather than
/// failing the whole profile fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum Role {
    Admin,
    BuildingManager,
    Security,
    Cafeteria,
    #[default]
    #[serde(other)]
    Other,
}

impl Role {
    /// Roles whose data access is restricted to their own organizational unit.
    pub fn is_unit_scoped(&self) -> bool {
        matches!(self, Role::BuildingManager)
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

/// A user account. The authenticated one is the acting [`Principal`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct User {
    pub id: i64,

    pub username: String,

    #[serde(default)]
    pub role: Role,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_id: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

/// The currently authenticated user.
pub type Principal = User;

impl User {
    /// Unit the user is locked to, if their role is unit-scoped.
    pub fn scoped_unit(&self) -> Option<i64> {
        if self.role.is_unit_scoped() {
            self.unit_id
        } else {
            None
        }
    }
}

/// Payload for creating or updating a user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UserForm {
    pub username: String,

    /// Only sent on create; updates leave the password untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    pub role: Role,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_id: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

/// An organizational unit (building, faculty, cafeteria).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Unit {
    pub id: i64,
    pub name: String,
}

// =============================================================================
// Activity Log
// =============================================================================

/// One audit-trail row from `/activity-log`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ActivityLogEntry {
    pub id: i64,

    #[serde(default)]
    pub username: Option<String>,

    pub action: String,

    #[serde(default)]
    pub details: Option<String>,

    #[ts(as = "String")]
    pub timestamp: NaiveDateTime,
}

// =============================================================================
// Metrics
// =============================================================================

/// A named descriptive fact about campus infrastructure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Metric {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    pub metric_key: String,

    /// Servers send either a string or a bare number.
    #[serde(deserialize_with = "string_or_number")]
    pub metric_value: String,

    /// Always upper-case on the wire (e.g. `ENERGY_CLIMATE_CHANGE`).
    pub category: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Metric {
    /// Creates a metric with its category normalized to upper case.
    pub fn new(
        metric_key: impl Into<String>,
        metric_value: impl Into<String>,
        category: &str,
        description: Option<String>,
    ) -> Self {
        Metric {
            id: None,
            metric_key: metric_key.into(),
            metric_value: metric_value.into(),
            category: category.to_uppercase(),
            description,
        }
    }
}

/// One recorded change to a metric's value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct MetricHistoryEntry {
    pub id: i64,

    pub metric_key: String,

    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub old_value: Option<String>,

    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub new_value: Option<String>,

    #[serde(default)]
    pub changed_by: Option<String>,

    #[ts(as = "String")]
    pub changed_at: NaiveDateTime,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}

fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::String(s) => Ok(Some(s)),
        serde_json::Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}

// =============================================================================
// Statistics
// =============================================================================

/// Statistic groups served by `/public/statistics`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsCategory {
    Consumption,
    Vehicles,
    Waste,
}

impl StatsCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatsCategory::Consumption => "consumption",
            StatsCategory::Vehicles => "vehicles",
            StatsCategory::Waste => "waste",
        }
    }
}

/// Aggregation window for public statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatsPeriod {
    LastWeek,
    #[default]
    LastMonth,
    LastYear,
}

impl StatsPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatsPeriod::LastWeek => "last_week",
            StatsPeriod::LastMonth => "last_month",
            StatsPeriod::LastYear => "last_year",
        }
    }
}

impl std::str::FromStr for StatsPeriod {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "last_week" | "week" => Ok(StatsPeriod::LastWeek),
            "last_month" | "month" => Ok(StatsPeriod::LastMonth),
            "last_year" | "year" => Ok(StatsPeriod::LastYear),
            other => Err(CoreError::UnknownPeriod(other.to_string())),
        }
    }
}

/// Statistics payloads are rendered as-is by the view.
pub type Statistics = serde_json::Value;

// =============================================================================
// Pagination
// =============================================================================

/// One server page: `{content, number, totalPages, totalElements, size}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub content: Vec<T>,

    /// Zero-based page index.
    #[serde(default)]
    pub number: u32,

    #[serde(default)]
    pub total_pages: u32,

    #[serde(default)]
    pub total_elements: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
}

impl<T> Page<T> {
    /// The cursor the server reported alongside this page.
    pub fn cursor(&self) -> PageCursor {
        PageCursor {
            page: self.number,
            total_pages: self.total_pages,
            total_elements: self.total_elements,
        }
    }
}

/// Zero-based page index plus the server-reported totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PageCursor {
    pub page: u32,
    pub total_pages: u32,
    #[ts(as = "u32")]
    pub total_elements: u64,
}

impl PageCursor {
    /// True when `page` exists according to the last server response.
    pub fn contains(&self, page: u32) -> bool {
        page < self.total_pages
    }
}
