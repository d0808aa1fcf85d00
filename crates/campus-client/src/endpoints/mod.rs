//! # REST Endpoints
//!
//! Typed calls layered on [`ApiClient`](crate::http::ApiClient) as inherent
//! methods, one file per resource family.
//!
//! | File            | Resources                                          |
//! |-----------------|----------------------------------------------------|
//! | `entries.rs`    | `/entries/vehicle`, `/consumption/water`, ...      |
//! | `users.rs`      | `/users`, `/users/me`, `/units`                    |
//! | `metrics.rs`    | `/metrics`, `/metrics/history`                     |
//! | `statistics.rs` | `/public/statistics`                               |
//! | `activity.rs`   | `/activity-log`                                    |

pub mod activity;
pub mod entries;
pub mod metrics;
pub mod statistics;
pub mod users;

pub use activity::ActivityLogQuery;
pub use statistics::StatisticsBundle;

use serde::Serialize;

use crate::error::{ClientError, ClientResult};

/// Appends `params` as a query string, omitting it entirely when empty.
pub(crate) fn with_query<P: Serialize>(path: &str, params: &P) -> ClientResult<String> {
    let query = serde_urlencoded::to_string(params)
        .map_err(|e| ClientError::Serialization(e.to_string()))?;
    if query.is_empty() {
        Ok(path.to_string())
    } else {
        Ok(format!("{}?{}", path, query))
    }
}

/// `page`/`size` pair shared by the plain paginated endpoints.
#[derive(Debug, Clone, Copy, Serialize)]
pub(crate) struct PageParams {
    pub page: u32,
    pub size: u32,
}
