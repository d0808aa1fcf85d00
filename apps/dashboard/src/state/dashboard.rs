//! Dashboard view: public statistics, the audit log and the
//! cross-category recent-activity feed.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use campus_client::{ActivityLogQuery, ApiClient, StatisticsBundle};
use campus_core::query::PAGE_KEY;
use campus_core::{
    ActivityItem, ActivityLogEntry, LocationQuery, PageCursor, QueryMap, Statistics, StatsPeriod,
    RECENT_ACTIVITY_LIMIT,
};
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::{ErrorSlot, LoadingFlag};
use crate::location::{Location, Navigator};

/// Route of the full activity-log view.
pub const ACTIVITY_LOG_ROUTE: &str = "/activity-log";

/// Statistics for one period, as last fetched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSnapshot {
    pub period: StatsPeriod,
    pub consumption: Statistics,
    pub vehicles: Statistics,
    pub waste: Statistics,
}

#[derive(Debug, Default)]
struct ActivityLogState {
    entries: Vec<ActivityLogEntry>,
    cursor: PageCursor,
    recent: Vec<ActivityLogEntry>,
}

pub struct DashboardStore {
    client: ApiClient,
    navigator: Navigator,
    log_page_size: u32,
    stats: RwLock<Option<StatsSnapshot>>,
    log: RwLock<ActivityLogState>,
    /// Only the newest activity-log fetch may write `log`.
    log_generation: AtomicU64,
    recent_activity: RwLock<Vec<ActivityItem>>,
    loading: LoadingFlag,
    error: ErrorSlot,
}

impl DashboardStore {
    pub fn new(client: ApiClient, navigator: Navigator, log_page_size: u32) -> Self {
        DashboardStore {
            client,
            navigator,
            log_page_size,
            stats: RwLock::new(None),
            log: RwLock::new(ActivityLogState::default()),
            log_generation: AtomicU64::new(0),
            recent_activity: RwLock::new(Vec::new()),
            loading: LoadingFlag::default(),
            error: ErrorSlot::default(),
        }
    }

    // ===== Accessors =====

    pub fn stats(&self) -> Option<StatsSnapshot> {
        self.stats.read().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn activity_log(&self) -> Vec<ActivityLogEntry> {
        self.log.read().map(|l| l.entries.clone()).unwrap_or_default()
    }

    pub fn activity_cursor(&self) -> PageCursor {
        self.log.read().map(|l| l.cursor).unwrap_or_default()
    }

    /// Head of the first activity-log page.
    pub fn recent_log(&self) -> Vec<ActivityLogEntry> {
        self.log.read().map(|l| l.recent.clone()).unwrap_or_default()
    }

    /// Newest entries across all categories.
    pub fn recent_activity(&self) -> Vec<ActivityItem> {
        self.recent_activity
            .read()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    pub(crate) fn set_recent_activity(&self, items: Vec<ActivityItem>) {
        if let Ok(mut guard) = self.recent_activity.write() {
            *guard = items;
        }
    }

    pub(crate) fn loading_flag(&self) -> &LoadingFlag {
        &self.loading
    }

    pub(crate) fn error_slot(&self) -> &ErrorSlot {
        &self.error
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

    // ===== Fetching =====

    /// Fetches all three statistic groups; nothing changes unless all succeed.
    pub async fn get_stats(&self, period: StatsPeriod) -> bool {
        let _loading = self.loading.start();
        self.error.clear();

        match self.client.statistics_bundle(period).await {
            Ok(StatisticsBundle {
                consumption,
                vehicles,
                waste,
            }) => {
                if let Ok(mut guard) = self.stats.write() {
                    *guard = Some(StatsSnapshot {
                        period,
                        consumption,
                        vehicles,
                        waste,
                    });
                }
                true
            }
            Err(e) => {
                warn!(period = period.as_str(), error = %e, "Failed to fetch statistics");
                self.error.set(e.user_message());
                false
            }
        }
    }

    /// Loads one page of the audit log; page 0 also refreshes `recent_log`.
    ///
    /// Returns `false` without touching the log when a newer fetch started
    /// before this one finished.
    pub async fn get_activity_log(&self, page: u32, size: u32) -> bool {
        let generation = self.log_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let _loading = self.loading.start();
        self.error.clear();

        let result = self
            .client
            .activity_log(&ActivityLogQuery::page(page, size))
            .await;

        if self.log_generation.load(Ordering::SeqCst) != generation {
            debug!(page, generation, "Discarding superseded activity log response");
            return false;
        }

        match result {
            Ok(fetched) => {
                if let Ok(mut log) = self.log.write() {
                    log.cursor = fetched.cursor();
                    if page == 0 {
                        log.recent = fetched
                            .content
                            .iter()
                            .take(RECENT_ACTIVITY_LIMIT)
                            .cloned()
                            .collect();
                    }
                    log.entries = fetched.content;
                }
                true
            }
            Err(e) => {
                warn!(page, error = %e, "Failed to fetch activity log");
                self.error.set(e.user_message());
                false
            }
        }
    }

    /// Navigates to `page` of the activity log if the cursor has it.
    pub fn change_page(&self, page: u32) -> bool {
        let cursor = self.activity_cursor();
        if !cursor.contains(page) {
            debug!(page, total_pages = cursor.total_pages, "Activity log page out of range");
            return false;
        }
        let mut query = QueryMap::new();
        query.insert(PAGE_KEY.to_string(), page.to_string());
        self.navigator
            .push(Location::new(ACTIVITY_LOG_ROUTE).with_query(query));
        true
    }

    /// Loads the page an `/activity-log` location carries.
    pub async fn init_from_location(&self, query: &QueryMap) -> bool {
        let page = LocationQuery::from_query_map(query).page_or_first();
        self.get_activity_log(page, self.log_page_size).await
    }

    pub fn observe(self: &Arc<Self>) -> JoinHandle<()> {
        let store = self.clone();
        self.navigator.observe(ACTIVITY_LOG_ROUTE, move |location| {
            let store = store.clone();
            async move {
                debug!(location = %location, "Activity log location");
                store.init_from_location(&location.query).await;
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_client::ClientConfig;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn store(server: &MockServer) -> DashboardStore {
        let config = ClientConfig::with_base_url(format!("{}/api", server.uri()));
        DashboardStore::new(ApiClient::new(&config).unwrap(), Navigator::default(), 20)
    }

    fn log_page(count: i64, number: u32) -> serde_json::Value {
        let content: Vec<_> = (1..=count)
            .map(|id| {
                json!({
                    "id": id, "username": "admin", "action": "UPDATE_METRIC",
                    "timestamp": "2025-07-01T09:00:00"
                })
            })
            .collect();
        json!({"content": content, "number": number, "totalPages": 3, "totalElements": 45})
    }

    #[tokio::test]
    async fn test_first_page_sets_recent_log() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/activity-log"))
            .and(query_param("page", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(log_page(20, 0)))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/activity-log"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(log_page(20, 1)))
            .mount(&server)
            .await;

        let dashboard = store(&server);
        assert!(dashboard.get_activity_log(0, 20).await);
        assert_eq!(dashboard.recent_log().len(), 5);
        assert_eq!(dashboard.activity_log().len(), 20);

        assert!(dashboard.get_activity_log(1, 20).await);
        assert_eq!(dashboard.activity_cursor().page, 1);
        assert_eq!(dashboard.recent_log()[0].id, 1);
    }

    #[tokio::test]
    async fn test_stale_log_page_is_discarded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/activity-log"))
            .and(query_param("page", "0"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(log_page(20, 0))
                    .set_delay(std::time::Duration::from_millis(300)),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/activity-log"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(log_page(7, 1)))
            .mount(&server)
            .await;

        let dashboard = store(&server);
        let (first, second) = tokio::join!(
            dashboard.get_activity_log(0, 20),
            dashboard.get_activity_log(1, 20)
        );

        assert!(!first);
        assert!(second);
        assert_eq!(dashboard.activity_cursor().page, 1);
        assert_eq!(dashboard.activity_log().len(), 7);
        assert!(dashboard.recent_log().is_empty());
        assert!(dashboard.error().is_none());
        assert!(!dashboard.is_loading());
    }

    #[tokio::test]
    async fn test_change_page_pushes_location_within_bounds() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/activity-log"))
            .respond_with(ResponseTemplate::new(200).set_body_json(log_page(20, 0)))
            .mount(&server)
            .await;

        let dashboard = store(&server);
        assert!(!dashboard.change_page(1));
        assert_eq!(dashboard.navigator.current().path, "/");

        assert!(dashboard.get_activity_log(0, 20).await);
        assert!(dashboard.change_page(2));
        assert_eq!(dashboard.navigator.current().href(), "/activity-log?page=2");

        assert!(!dashboard.change_page(3));
        assert_eq!(dashboard.navigator.current().href(), "/activity-log?page=2");
    }

    #[tokio::test]
    async fn test_stats_fail_as_a_group() {
        let server = MockServer::start().await;
        for (category, status) in [("consumption", 200), ("vehicles", 200), ("waste", 500)] {
            Mock::given(method("GET"))
                .and(path("/api/public/statistics"))
                .and(query_param("category", category))
                .respond_with(ResponseTemplate::new(status).set_body_json(json!({"total": 1})))
                .mount(&server)
                .await;
        }

        let dashboard = store(&server);
        assert!(!dashboard.get_stats(StatsPeriod::LastMonth).await);
        assert_eq!(dashboard.stats(), None);
        assert!(dashboard.error().is_some());
    }
}
