//! Campus metrics, held for every category fetched so far.

use std::sync::RwLock;

use campus_client::ApiClient;
use campus_core::{Metric, MetricHistoryEntry, Page};
use tracing::{info, warn};

use super::{ErrorSlot, LoadingFlag};

pub struct MetricsStore {
    client: ApiClient,
    metrics: RwLock<Vec<Metric>>,
    history: RwLock<Option<Page<MetricHistoryEntry>>>,
    page_size: u32,
    loading: LoadingFlag,
    error: ErrorSlot,
}

impl MetricsStore {
    pub fn new(client: ApiClient, page_size: u32) -> Self {
        MetricsStore {
            client,
            metrics: RwLock::new(Vec::new()),
            history: RwLock::new(None),
            page_size,
            loading: LoadingFlag::default(),
            error: ErrorSlot::default(),
        }
    }

    pub fn metrics(&self) -> Vec<Metric> {
        self.metrics.read().map(|m| m.clone()).unwrap_or_default()
    }

    /// Held metrics of one category (case-insensitive).
    pub fn metrics_for(&self, category: &str) -> Vec<Metric> {
        let category = category.to_uppercase();
        self.metrics()
            .into_iter()
            .filter(|m| m.category == category)
            .collect()
    }

    pub fn history(&self) -> Option<Page<MetricHistoryEntry>> {
        self.history.read().map(|h| h.clone()).unwrap_or_default()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_loading()
    }

    pub fn error(&self) -> Option<String> {
        self.error.get()
    }

    pub fn clear_error(&self) {
        self.error.clear();
    }

    /// Loads `category`, replacing only that category's held metrics.
    pub async fn get_metrics(&self, category: &str) -> bool {
        let _loading = self.loading.start();
        self.error.clear();
        let category = category.to_uppercase();

        match self.client.list_metrics(&category).await {
            Ok(fresh) => {
                if let Ok(mut metrics) = self.metrics.write() {
                    metrics.retain(|m| m.category != category);
                    metrics.extend(fresh);
                }
                true
            }
            Err(e) => {
                warn!(category = %category, error = %e, "Failed to fetch metrics");
                self.error.set(e.user_message());
                false
            }
        }
    }

    pub async fn create_metric(&self, metric: Metric) -> bool {
        let _loading = self.loading.start();
        self.error.clear();

        match self.client.create_metric(&metric).await {
            Ok(()) => self.get_metrics(&metric.category).await,
            Err(e) => {
                warn!(key = %metric.metric_key, error = %e, "Failed to create metric");
                self.error.set(e.user_message());
                false
            }
        }
    }

    pub async fn update_metric(&self, metric: Metric) -> bool {
        let _loading = self.loading.start();
        self.error.clear();

        match self.client.update_metric(&metric).await {
            Ok(()) => {
                info!(key = %metric.metric_key, "Metric saved");
                self.get_metrics(&metric.category).await
            }
            Err(e) => {
                warn!(key = %metric.metric_key, error = %e, "Failed to update metric");
                self.error.set(e.user_message());
                false
            }
        }
    }

    /// Loads one page of value changes, optionally for a single key.
    pub async fn load_history(&self, metric_key: Option<&str>, page: u32) -> bool {
        let _loading = self.loading.start();
        self.error.clear();

        match self
            .client
            .metric_history(metric_key, page, self.page_size)
            .await
        {
            Ok(history) => {
                if let Ok(mut guard) = self.history.write() {
                    *guard = Some(history);
                }
                true
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch metric history");
                self.error.set(e.user_message());
                false
            }
        }
    }
}
