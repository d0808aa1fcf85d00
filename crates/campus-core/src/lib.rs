//! # campus-core: Pure Domain Logic for Campus Pulse
//!
//! Types and rules shared by the REST client and the dashboard stores, with
//! zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Campus Pulse Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Browser views (external)                     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │            apps/dashboard: stores, aggregator, navigator        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │            campus-client: HTTP, endpoints, session              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ campus-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐  ┌──────────┐  ┌─────────┐  ┌──────────────────┐ │   │
//! │  │   │  types  │  │  filter  │  │  query  │  │ activity         │ │   │
//! │  │   │ entries │  │ role     │  │ location│  │ merge newest     │ │   │
//! │  │   │ users   │  │ override │  │ codec   │  │ first            │ │   │
//! │  │   └─────────┘  └──────────┘  └─────────┘  └──────────────────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • PURE FUNCTIONS                          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Entries, users, metrics, pages
//! - [`filter`] - Entry filters and list requests
//! - [`query`] - Navigable-location query codec
//! - [`activity`] - Recent-activity feed merge
//! - [`validation`] - Input validation
//! - [`error`] - Domain error types

pub mod activity;
pub mod error;
pub mod filter;
pub mod query;
pub mod types;
pub mod validation;

pub use activity::{merge_recent, tag_entries, ActivityItem};
pub use error::{CoreError, ValidationError};
pub use filter::{EntryFilter, ListRequest};
pub use query::{LocationQuery, QueryMap};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default page size for entry lists.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Page size used by the full activity-log view.
pub const ACTIVITY_LOG_PAGE_SIZE: u32 = 20;

/// Largest page size the client will request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Number of items shown in the dashboard's recent-activity feed.
pub const RECENT_ACTIVITY_LIMIT: usize = 5;
