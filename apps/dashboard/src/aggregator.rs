//! # Recent Activity Aggregator
//!
//! Builds the dashboard's cross-category feed from the four entry stores.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  reset filter + page 0 on every category store                          │
//! │                                                                         │
//! │   vehicles ──┐                                                          │
//! │   water    ──┤  concurrent fetch   ┌──────────────┐   ┌──────────────┐  │
//! │   electric ──┼───────────────────►│ tag + merge  │──►│ newest N     │  │
//! │   waste    ──┘  (join policy)      │ stable sort  │   │ recent feed  │  │
//! │                                    └──────────────┘   └──────────────┘  │
//! │                                                                         │
//! │  AllOrNothing: one failed category fails the refresh and the feed       │
//! │  keeps its previous value. Partial: merge whatever succeeded.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use campus_core::{
    merge_recent, tag_entries, ActivityItem, Category, ElectricityEntry, Entry, EntryFilter,
    Principal, VehicleEntry, WasteEntry, WaterEntry,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::state::{DashboardStore, ListOutcome, QueryStore};

/// How a failed category affects the whole refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinPolicy {
    /// Any failure fails the refresh; nothing is merged.
    #[default]
    AllOrNothing,
    /// Merge the categories that succeeded and report the rest.
    Partial,
}

/// A category whose fetch did not produce entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryFailure {
    pub category: Category,
    pub message: String,
}

/// Result of a refresh that updated the feed.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateReport {
    pub items: Vec<ActivityItem>,
    /// Empty under [`JoinPolicy::AllOrNothing`].
    pub failed: Vec<CategoryFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Failed to load recent activity: {}", describe(.failed))]
pub struct AggregateError {
    pub failed: Vec<CategoryFailure>,
}

fn describe(failed: &[CategoryFailure]) -> String {
    failed
        .iter()
        .map(|f| format!("{} ({})", f.category, f.message))
        .collect::<Vec<_>>()
        .join(", ")
}

type Branch = Result<Vec<ActivityItem>, CategoryFailure>;

async fn branch<E: Entry>(store: &QueryStore<E>, principal: Option<&Principal>) -> Branch {
    match store.list(EntryFilter::default(), 0, principal).await {
        ListOutcome::Applied(page) => Ok(tag_entries(&page.content)),
        ListOutcome::Failed(message) => Err(CategoryFailure {
            category: E::CATEGORY,
            message,
        }),
        ListOutcome::Superseded | ListOutcome::Skipped => Err(CategoryFailure {
            category: E::CATEGORY,
            message: "superseded by a newer request".to_string(),
        }),
    }
}

pub struct ActivityAggregator {
    vehicles: QueryStore<VehicleEntry>,
    water: QueryStore<WaterEntry>,
    electricity: QueryStore<ElectricityEntry>,
    waste: QueryStore<WasteEntry>,
    dashboard: Arc<DashboardStore>,
    limit: usize,
    policy: JoinPolicy,
}

impl ActivityAggregator {
    pub fn new(
        vehicles: QueryStore<VehicleEntry>,
        water: QueryStore<WaterEntry>,
        electricity: QueryStore<ElectricityEntry>,
        waste: QueryStore<WasteEntry>,
        dashboard: Arc<DashboardStore>,
        limit: usize,
    ) -> Self {
        ActivityAggregator {
            vehicles,
            water,
            electricity,
            waste,
            dashboard,
            limit,
            policy: JoinPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: JoinPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> JoinPolicy {
        self.policy
    }

    /// Re-fetches the first page of every category and rebuilds the feed.
    ///
    /// On error the dashboard's feed is left untouched and its error set.
    pub async fn refresh(
        &self,
        principal: Option<&Principal>,
    ) -> Result<AggregateReport, AggregateError> {
        let _loading = self.dashboard.loading_flag().start();
        self.dashboard.error_slot().clear();

        let result = match self.policy {
            JoinPolicy::AllOrNothing => self.join_all(principal).await,
            JoinPolicy::Partial => self.join_partial(principal).await,
        };

        match result {
            Ok((batches, failed)) => {
                let items = merge_recent(batches, self.limit);
                info!(
                    items = items.len(),
                    failed = failed.len(),
                    "Recent activity refreshed"
                );
                self.dashboard.set_recent_activity(items.clone());
                Ok(AggregateReport { items, failed })
            }
            Err(err) => {
                warn!(error = %err, "Recent activity refresh failed");
                self.dashboard.error_slot().set(err.to_string());
                Err(err)
            }
        }
    }

    async fn join_all(
        &self,
        principal: Option<&Principal>,
    ) -> Result<(Vec<Vec<ActivityItem>>, Vec<CategoryFailure>), AggregateError> {
        let (vehicles, water, electricity, waste) = tokio::try_join!(
            branch(&self.vehicles, principal),
            branch(&self.water, principal),
            branch(&self.electricity, principal),
            branch(&self.waste, principal),
        )
        .map_err(|failure| AggregateError {
            failed: vec![failure],
        })?;
        Ok((vec![vehicles, water, electricity, waste], Vec::new()))
    }

    async fn join_partial(
        &self,
        principal: Option<&Principal>,
    ) -> Result<(Vec<Vec<ActivityItem>>, Vec<CategoryFailure>), AggregateError> {
        let (vehicles, water, electricity, waste) = tokio::join!(
            branch(&self.vehicles, principal),
            branch(&self.water, principal),
            branch(&self.electricity, principal),
            branch(&self.waste, principal),
        );

        let mut batches = Vec::new();
        let mut failed = Vec::new();
        for outcome in [vehicles, water, electricity, waste] {
            match outcome {
                Ok(batch) => batches.push(batch),
                Err(failure) => failed.push(failure),
            }
        }
        if batches.is_empty() {
            return Err(AggregateError { failed });
        }
        Ok((batches, failed))
    }
}
