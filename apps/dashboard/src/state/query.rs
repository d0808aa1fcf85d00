//! # Category Query Store
//!
//! One generic store serves all four entry categories. It owns a page of
//! entries, the filter the user picked, the server's page cursor and the
//! usual loading/error pair.
//!
//! ## Fetch ordering
//! ```text
//!   list(A) ── gen 1 ─────────────────────────────► response A  (discarded)
//!        list(B) ── gen 2 ──────► response B  (applied)
//!
//!   Only the response whose generation is still the latest is applied.
//! ```
//!
//! ## Location sync
//! `apply_filter` and `change_page` never fetch directly; they push a new
//! location and the route observer calls `init_from_location`, which
//! fetches unless the same effective request is already loaded.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use campus_client::{ApiClient, Session};
use campus_core::{
    Entry, EntryFilter, ListRequest, LocationQuery, Page, PageCursor, Principal, QueryMap,
};
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use super::{ErrorSlot, LoadingFlag};
use crate::location::{Location, Navigator};

/// What became of a fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum ListOutcome<E> {
    /// The page replaced the store's entries.
    Applied(Page<E>),
    /// The same effective request was already loaded; nothing was sent.
    Skipped,
    /// A newer fetch started before this one finished; its result was dropped.
    Superseded,
    /// The request failed; the message is also in the store's error.
    Failed(String),
}

impl<E> ListOutcome<E> {
    pub fn is_applied(&self) -> bool {
        matches!(self, ListOutcome::Applied(_))
    }
}

/// Read-only view of a query store for rendering.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuerySnapshot<E> {
    pub entries: Vec<E>,
    pub filter: EntryFilter,
    pub cursor: PageCursor,
    pub loading: bool,
    pub error: Option<String>,
}

impl<E> Default for QuerySnapshot<E> {
    fn default() -> Self {
        QuerySnapshot {
            entries: Vec::new(),
            filter: EntryFilter::default(),
            cursor: PageCursor::default(),
            loading: false,
            error: None,
        }
    }
}

struct QueryState<E> {
    entries: Vec<E>,
    filter: EntryFilter,
    cursor: PageCursor,
    /// Effective request behind `entries`, cleared when a fetch fails.
    loaded: Option<ListRequest>,
}

struct QueryInner<E> {
    client: ApiClient,
    navigator: Navigator,
    page_size: u32,
    state: RwLock<QueryState<E>>,
    generation: AtomicU64,
    loading: LoadingFlag,
    error: ErrorSlot,
}

/// Paged, filterable list of one entry category.
pub struct QueryStore<E: Entry> {
    inner: Arc<QueryInner<E>>,
}

impl<E: Entry> Clone for QueryStore<E> {
    fn clone(&self) -> Self {
        QueryStore {
            inner: self.inner.clone(),
        }
    }
}

impl<E: Entry> QueryStore<E> {
    pub fn new(client: ApiClient, navigator: Navigator, page_size: u32) -> Self {
        QueryStore {
            inner: Arc::new(QueryInner {
                client,
                navigator,
                page_size,
                state: RwLock::new(QueryState {
                    entries: Vec::new(),
                    filter: EntryFilter::default(),
                    cursor: PageCursor::default(),
                    loaded: None,
                }),
                generation: AtomicU64::new(0),
                loading: LoadingFlag::default(),
                error: ErrorSlot::default(),
            }),
        }
    }

    /// Route of this category's list view.
    pub fn route(&self) -> &'static str {
        E::CATEGORY.route()
    }

    // ===== Accessors =====

    pub fn snapshot(&self) -> QuerySnapshot<E> {
        let loading = self.is_loading();
        let error = self.error();
        self.inner
            .state
            .read()
            .map(|s| QuerySnapshot {
                entries: s.entries.clone(),
                filter: s.filter.clone(),
                cursor: s.cursor,
                loading,
                error,
            })
            .unwrap_or_default()
    }

    pub fn entries(&self) -> Vec<E> {
        self.inner
            .state
            .read()
            .map(|s| s.entries.clone())
            .unwrap_or_default()
    }

    pub fn filter(&self) -> EntryFilter {
        self.inner
            .state
            .read()
            .map(|s| s.filter.clone())
            .unwrap_or_default()
    }

    pub fn cursor(&self) -> PageCursor {
        self.inner
            .state
            .read()
            .map(|s| s.cursor)
            .unwrap_or_default()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.loading.is_loading()
    }

    pub fn error(&self) -> Option<String> {
        self.inner.error.get()
    }

    pub fn clear_error(&self) {
        self.inner.error.clear();
    }

    fn update(&self, f: impl FnOnce(&mut QueryState<E>)) {
        if let Ok(mut state) = self.inner.state.write() {
            f(&mut state);
        }
    }

    // ===== Fetching =====

    /// Fetches `page` of entries matching `filter`.
    ///
    /// A unit-scoped `principal` always sees its own unit, whatever unit
    /// the filter names. On failure the previous entries stay visible.
    pub async fn list(
        &self,
        filter: EntryFilter,
        page: u32,
        principal: Option<&Principal>,
    ) -> ListOutcome<E> {
        let request = ListRequest::new(filter.effective_for(principal), page, self.inner.page_size);
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let _loading = self.inner.loading.start();
        self.inner.error.clear();
        self.update(|s| s.filter = filter);

        let result = self.inner.client.list_entries::<E>(&request).await;

        if self.inner.generation.load(Ordering::SeqCst) != generation {
            debug!(category = %E::CATEGORY, generation, "Discarding superseded response");
            return ListOutcome::Superseded;
        }

        match result {
            Ok(page) => {
                self.update(|s| {
                    s.entries = page.content.clone();
                    s.cursor = page.cursor();
                    s.loaded = Some(request);
                });
                ListOutcome::Applied(page)
            }
            Err(e) => {
                let message = e.user_message();
                warn!(category = %E::CATEGORY, error = %e, "Failed to fetch entries");
                self.inner.error.set(message.clone());
                self.update(|s| s.loaded = None);
                ListOutcome::Failed(message)
            }
        }
    }

    /// Re-fetches whatever filter and page the store currently shows.
    pub async fn refresh(&self, principal: Option<&Principal>) -> ListOutcome<E> {
        let (filter, page) = self
            .inner
            .state
            .read()
            .map(|s| (s.filter.clone(), s.cursor.page))
            .unwrap_or_default();
        self.list(filter, page, principal).await
    }

    /// Submits `entry`, then re-fetches the current page.
    pub async fn create(&self, entry: E, principal: Option<&Principal>) -> bool {
        let _loading = self.inner.loading.start();
        self.inner.error.clear();

        match self.inner.client.create_entry(&entry).await {
            Ok(()) => {
                info!(category = %E::CATEGORY, "Entry created");
                self.refresh(principal).await;
                true
            }
            Err(e) => {
                warn!(category = %E::CATEGORY, error = %e, "Failed to create entry");
                self.inner.error.set(e.user_message());
                false
            }
        }
    }

    /// Deletes entry `id`, then re-fetches the current page.
    pub async fn remove(&self, id: i64, principal: Option<&Principal>) -> bool {
        let _loading = self.inner.loading.start();
        self.inner.error.clear();

        match self.inner.client.delete_entry::<E>(id).await {
            Ok(()) => {
                self.refresh(principal).await;
                true
            }
            Err(e) => {
                warn!(category = %E::CATEGORY, id, error = %e, "Failed to delete entry");
                self.inner.error.set(e.user_message());
                false
            }
        }
    }

    // ===== Location sync =====

    /// Records `filter`, resets to the first page and navigates there.
    ///
    /// An inverted date range is refused without touching the location.
    pub fn apply_filter(&self, filter: EntryFilter) -> bool {
        if let Err(e) = filter.validate() {
            self.inner.error.set(e.to_string());
            return false;
        }
        self.inner.error.clear();
        self.update(|s| {
            s.filter = filter.clone();
            s.cursor.page = 0;
        });
        self.navigate(LocationQuery::new(filter, 0));
        true
    }

    pub fn clear_filters(&self) -> bool {
        self.apply_filter(EntryFilter::default())
    }

    /// Navigates to `page` of the current filter if the cursor has it.
    pub fn change_page(&self, page: u32) -> bool {
        let (filter, cursor) = self
            .inner
            .state
            .read()
            .map(|s| (s.filter.clone(), s.cursor))
            .unwrap_or_default();
        if !cursor.contains(page) {
            debug!(category = %E::CATEGORY, page, total_pages = cursor.total_pages, "Page out of range");
            return false;
        }
        self.navigate(LocationQuery::new(filter, page));
        true
    }

    fn navigate(&self, query: LocationQuery) {
        let location = Location::new(E::CATEGORY.route()).with_query(query.to_query_map());
        self.inner.navigator.push(location);
    }

    /// Loads the filter and page a location carries.
    ///
    /// Does nothing when the same effective request is already loaded.
    /// Any fetch still in flight for an older location is superseded.
    pub async fn init_from_location(
        &self,
        query: &QueryMap,
        principal: Option<&Principal>,
    ) -> ListOutcome<E> {
        let parsed = LocationQuery::from_query_map(query);
        let page = parsed.page_or_first();
        let request = ListRequest::new(
            parsed.filter.effective_for(principal),
            page,
            self.inner.page_size,
        );

        let already_loaded = self
            .inner
            .state
            .read()
            .map(|s| s.loaded.as_ref() == Some(&request))
            .unwrap_or(false);
        if already_loaded {
            trace!(category = %E::CATEGORY, page, "Location already loaded");
            self.inner.generation.fetch_add(1, Ordering::SeqCst);
            self.update(|s| s.filter = parsed.filter);
            return ListOutcome::Skipped;
        }

        self.list(parsed.filter, page, principal).await
    }

    /// Spawns the task that keeps this store in step with the location.
    pub fn observe(&self, session: Arc<Session>) -> JoinHandle<()> {
        let store = self.clone();
        self.inner
            .navigator
            .observe(E::CATEGORY.route(), move |location| {
                let store = store.clone();
                let session = session.clone();
                async move {
                    let principal = session.principal();
                    store
                        .init_from_location(&location.query, principal.as_ref())
                        .await;
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_client::ClientConfig;
    use campus_core::{ElectricityEntry, Role, User, WasteEntry, WaterEntry};
    use chrono::NaiveDate;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn store<E: Entry>(server: &MockServer) -> QueryStore<E> {
        let config = ClientConfig::with_base_url(format!("{}/api", server.uri()));
        let client = ApiClient::new(&config).unwrap();
        QueryStore::new(client, Navigator::default(), 10)
    }

    fn water_page(ids: &[i64], number: u32, total_pages: u32) -> serde_json::Value {
        let content: Vec<_> = ids
            .iter()
            .map(|id| json!({"id": id, "periodStartDate": "2025-06-01", "periodEndDate": "2025-06-30", "consumptionTon": 10.0}))
            .collect();
        json!({
            "content": content,
            "number": number,
            "totalPages": total_pages,
            "totalElements": ids.len()
        })
    }

    fn manager(unit: i64) -> User {
        User {
            id: 9,
            username: "bina_yoneticisi".into(),
            role: Role::BuildingManager,
            unit_id: Some(unit),
            unit_name: None,
            email: None,
            full_name: None,
        }
    }

    #[tokio::test]
    async fn test_location_loads_filtered_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/consumption/water"))
            .and(query_param("startDate", "2025-06-01"))
            .and(query_param("endDate", "2025-06-30"))
            .and(query_param("page", "0"))
            .and(query_param("size", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(water_page(&[1, 2], 0, 1)))
            .mount(&server)
            .await;

        let water = store::<WaterEntry>(&server);
        let location = Location::parse("/water-consumption?startDate=2025-06-01&endDate=2025-06-30");
        let outcome = water.init_from_location(&location.query, None).await;

        assert!(outcome.is_applied());
        let snapshot = water.snapshot();
        assert_eq!(snapshot.entries.len(), 2);
        assert_eq!(snapshot.cursor.total_pages, 1);
        assert_eq!(snapshot.filter.start_date, Some(date(2025, 6, 1)));
        assert!(!snapshot.loading);
        assert_eq!(snapshot.error, None);
    }

    #[tokio::test]
    async fn test_unit_scoped_principal_overrides_unit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/consumption/water"))
            .and(query_param("unitId", "7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(water_page(&[5], 0, 1)))
            .expect(1)
            .mount(&server)
            .await;

        let water = store::<WaterEntry>(&server);
        let filter = EntryFilter::default().with_unit(3);
        let outcome = water.list(filter, 0, Some(&manager(7))).await;

        assert!(outcome.is_applied());
        // The UI keeps the unit the user picked; only the request is scoped.
        assert_eq!(water.filter().unit_id, Some(3));
    }

    #[tokio::test]
    async fn test_same_location_is_not_refetched() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/consumption/water"))
            .respond_with(ResponseTemplate::new(200).set_body_json(water_page(&[1], 0, 1)))
            .expect(1)
            .mount(&server)
            .await;

        let water = store::<WaterEntry>(&server);
        let query = Location::parse("/water-consumption?page=0").query;
        assert!(water.init_from_location(&query, None).await.is_applied());
        assert_eq!(water.init_from_location(&query, None).await, ListOutcome::Skipped);
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_previous_entries() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/consumption/water"))
            .and(query_param("page", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(water_page(&[1, 2], 0, 2)))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/consumption/water"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "Database unavailable"})))
            .mount(&server)
            .await;

        let water = store::<WaterEntry>(&server);
        water.list(EntryFilter::default(), 0, None).await;
        let outcome = water.list(EntryFilter::default(), 1, None).await;

        assert_eq!(outcome, ListOutcome::Failed("Database unavailable".into()));
        let snapshot = water.snapshot();
        assert_eq!(snapshot.entries.len(), 2);
        assert_eq!(snapshot.cursor.page, 0);
        assert_eq!(snapshot.error.as_deref(), Some("Database unavailable"));
        assert!(!snapshot.loading);
    }

    #[tokio::test]
    async fn test_stale_response_is_discarded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/consumption/water"))
            .and(query_param("page", "0"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(water_page(&[1], 0, 2))
                    .set_delay(Duration::from_millis(300)),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/consumption/water"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(water_page(&[2], 1, 2)))
            .mount(&server)
            .await;

        let water = store::<WaterEntry>(&server);
        let (slow, fast) = tokio::join!(
            water.list(EntryFilter::default(), 0, None),
            water.list(EntryFilter::default(), 1, None),
        );

        assert_eq!(slow, ListOutcome::Superseded);
        assert!(fast.is_applied());
        assert_eq!(water.cursor().page, 1);
        assert_eq!(water.entries()[0].id, Some(2));
        assert!(!water.is_loading());
    }

    #[tokio::test]
    async fn test_apply_filter_resets_page_and_navigates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/consumption/water"))
            .respond_with(ResponseTemplate::new(200).set_body_json(water_page(&[1], 2, 3)))
            .mount(&server)
            .await;

        let water = store::<WaterEntry>(&server);
        water.list(EntryFilter::default(), 2, None).await;
        assert_eq!(water.cursor().page, 2);

        let filter = EntryFilter::new(Some(date(2025, 6, 1)), Some(date(2025, 6, 30)));
        assert!(water.apply_filter(filter));

        assert_eq!(water.cursor().page, 0);
        assert_eq!(
            water.inner.navigator.current().href(),
            "/water-consumption?endDate=2025-06-30&page=0&startDate=2025-06-01"
        );
    }

    #[tokio::test]
    async fn test_apply_filter_rejects_inverted_range() {
        let server = MockServer::start().await;
        let water = store::<WaterEntry>(&server);

        let filter = EntryFilter::new(Some(date(2025, 6, 30)), Some(date(2025, 6, 1)));
        assert!(!water.apply_filter(filter));
        assert!(water.error().is_some());
        assert_eq!(water.inner.navigator.current().path, "/");
    }

    #[tokio::test]
    async fn test_change_page_is_bounds_checked() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/consumption/water"))
            .respond_with(ResponseTemplate::new(200).set_body_json(water_page(&[1], 0, 3)))
            .mount(&server)
            .await;

        let water = store::<WaterEntry>(&server);
        water.list(EntryFilter::default(), 0, None).await;

        assert!(!water.change_page(3));
        assert!(water.change_page(2));
        assert_eq!(
            water.inner.navigator.current().href(),
            "/water-consumption?page=2"
        );
    }

    #[tokio::test]
    async fn test_create_refetches_current_page() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/consumption/water"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/consumption/water"))
            .respond_with(ResponseTemplate::new(200).set_body_json(water_page(&[1, 2, 3], 0, 1)))
            .expect(1)
            .mount(&server)
            .await;

        let water = store::<WaterEntry>(&server);
        let entry = WaterEntry {
            id: None,
            period_start_date: date(2025, 7, 1),
            period_end_date: date(2025, 7, 31),
            consumption_ton: 130.0,
            recycled_water_usage_liters: 0.0,
            treated_water_consumption_liters: 0.0,
            unit_id: Some(4),
            unit_name: None,
            submitted_by: None,
        };

        assert!(water.create(entry, None).await);
        assert_eq!(water.entries().len(), 3);
    }

    #[tokio::test]
    async fn test_electricity_delete_is_refused_locally() {
        let server = MockServer::start().await;
        let electricity = store::<ElectricityEntry>(&server);

        assert!(!electricity.remove(12, None).await);
        assert!(electricity.error().is_some());
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_observer_follows_navigation() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/entries/waste"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [{"id": 3, "dataDate": "2025-07-02", "organicProductionKg": 12.5}],
                "number": 1, "totalPages": 2, "totalElements": 11
            })))
            .mount(&server)
            .await;

        let config = ClientConfig::with_base_url(format!("{}/api", server.uri()));
        let session = Arc::new(
            Session::new(&config, Arc::new(campus_client::MemoryTokenStore::new())).unwrap(),
        );
        let navigator = Navigator::default();
        let waste: QueryStore<WasteEntry> =
            QueryStore::new(session.client().clone(), navigator.clone(), 10);
        let _task = waste.observe(session);

        navigator.push(Location::parse("/waste-data?page=1"));

        tokio::time::timeout(Duration::from_secs(2), async {
            while waste.entries().is_empty() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();
        assert_eq!(waste.cursor().page, 1);
    }
}
