//! # Application Context
//!
//! Built once at startup and passed to whatever renders the views. Owns the
//! configuration, the session, the navigator and every store.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  AppContext                                                             │
//! │  ├── config: ClientConfig                                               │
//! │  ├── session: Arc<Session> ──► ApiClient (cloned into each store)       │
//! │  ├── navigator: Navigator  ──► one observer task per list route         │
//! │  ├── vehicles / water / electricity / waste: QueryStore<E>              │
//! │  ├── metrics, users, units                                              │
//! │  ├── dashboard: Arc<DashboardStore>                                     │
//! │  └── aggregator: ActivityAggregator (shares the four entry stores)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use campus_client::{ClientConfig, Session, TokenStore};
use campus_core::{
    ElectricityEntry, Principal, StatsPeriod, VehicleEntry, WasteEntry, WaterEntry,
};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::aggregator::{ActivityAggregator, JoinPolicy};
use crate::error::AppError;
use crate::location::{Location, Navigator};
use crate::state::{DashboardStore, MetricsStore, QueryStore, UnitsStore, UserStore};

/// Route the dashboard opens on.
pub const HOME_ROUTE: &str = "/dashboard";

pub struct AppContext {
    config: ClientConfig,
    session: Arc<Session>,
    navigator: Navigator,
    pub vehicles: QueryStore<VehicleEntry>,
    pub water: QueryStore<WaterEntry>,
    pub electricity: QueryStore<ElectricityEntry>,
    pub waste: QueryStore<WasteEntry>,
    pub metrics: MetricsStore,
    pub users: UserStore,
    pub units: UnitsStore,
    pub dashboard: Arc<DashboardStore>,
    pub aggregator: ActivityAggregator,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("base_url", &self.config.base_url())
            .field("authenticated", &self.session.is_authenticated())
            .field("location", &self.navigator.current())
            .finish_non_exhaustive()
    }
}

impl AppContext {
    /// Builds the context over an explicit token store.
    pub fn new(config: ClientConfig, token_store: Arc<dyn TokenStore>) -> Result<Self, AppError> {
        config.validate()?;
        let session = Session::new(&config, token_store)?;
        Ok(Self::build(config, session))
    }

    /// Builds the context with the token store the config asks for.
    pub fn open(config: ClientConfig) -> Result<Self, AppError> {
        config.validate()?;
        let session = Session::open(&config)?;
        Ok(Self::build(config, session))
    }

    fn build(config: ClientConfig, session: Session) -> Self {
        let client = session.client().clone();
        let navigator = Navigator::new(Location::new(HOME_ROUTE));
        let page_size = config.lists.page_size;

        let vehicles = QueryStore::new(client.clone(), navigator.clone(), page_size);
        let water = QueryStore::new(client.clone(), navigator.clone(), page_size);
        let electricity = QueryStore::new(client.clone(), navigator.clone(), page_size);
        let waste = QueryStore::new(client.clone(), navigator.clone(), page_size);
        let dashboard = Arc::new(DashboardStore::new(
            client.clone(),
            navigator.clone(),
            config.lists.activity_log_page_size,
        ));
        let aggregator = ActivityAggregator::new(
            vehicles.clone(),
            water.clone(),
            electricity.clone(),
            waste.clone(),
            dashboard.clone(),
            config.lists.recent_activity_limit,
        );

        debug!(base_url = config.base_url(), page_size, "App context built");
        AppContext {
            metrics: MetricsStore::new(client.clone(), page_size),
            users: UserStore::new(client.clone(), page_size),
            units: UnitsStore::new(client),
            config,
            session: Arc::new(session),
            navigator,
            vehicles,
            water,
            electricity,
            waste,
            dashboard,
            aggregator,
        }
    }

    /// Switches how the recent-activity feed treats a failed category.
    pub fn with_join_policy(mut self, policy: JoinPolicy) -> Self {
        self.aggregator = self.aggregator.with_policy(policy);
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn principal(&self) -> Option<Principal> {
        self.session.principal()
    }

    /// Picks up a persisted session; a stale token is cleared.
    pub async fn restore(&self) -> bool {
        let restored = self.session.restore().await;
        if restored {
            info!("Session restored");
        }
        restored
    }

    /// Starts the tasks that keep list stores in step with the location.
    pub fn spawn_observers(&self) -> Vec<JoinHandle<()>> {
        vec![
            self.vehicles.observe(self.session.clone()),
            self.water.observe(self.session.clone()),
            self.electricity.observe(self.session.clone()),
            self.waste.observe(self.session.clone()),
            self.dashboard.observe(),
        ]
    }

    /// Loads statistics and the recent-activity feed together.
    ///
    /// Returns `true` only if both succeeded; failures are left in the
    /// dashboard store's error.
    pub async fn refresh_dashboard(&self, period: StatsPeriod) -> bool {
        let principal = self.principal();
        let (stats, activity) = tokio::join!(
            self.dashboard.get_stats(period),
            self.aggregator.refresh(principal.as_ref()),
        );
        stats && activity.is_ok()
    }

    pub fn logout(&self) {
        self.session.logout();
        self.navigator.push(Location::new("/login"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_client::{FileTokenStore, MemoryTokenStore};
    use campus_core::Role;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(server: &MockServer) -> ClientConfig {
        ClientConfig::with_base_url(format!("{}/api", server.uri()))
    }

    #[tokio::test]
    async fn test_restore_uses_persisted_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/users/me"))
            .and(header("Authorization", "Bearer stored-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 3, "username": "bina_yoneticisi", "role": "BUILDING_MANAGER", "unitId": 7
            })))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("token"));
        store.save("stored-token").unwrap();

        let ctx = AppContext::new(config(&server), Arc::new(store)).unwrap();
        assert!(ctx.restore().await);
        let principal = ctx.principal().unwrap();
        assert_eq!(principal.role, Role::BuildingManager);
        assert_eq!(principal.scoped_unit(), Some(7));
    }

    #[tokio::test]
    async fn test_invalid_config_is_rejected() {
        let mut config = ClientConfig::default();
        config.api.base_url = "not a url".into();
        let Err(err) = AppContext::new(config, Arc::new(MemoryTokenStore::new())) else {
            panic!("invalid base url was accepted");
        };
        assert_eq!(err.code, crate::error::ErrorCode::ConfigError);
    }

    #[tokio::test]
    async fn test_navigation_drives_scoped_fetch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/users/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 3, "username": "bina_yoneticisi", "role": "BUILDING_MANAGER", "unitId": 7
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/consumption/water"))
            .and(query_param("unitId", "7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [{"id": 1, "periodStartDate": "2025-06-01", "periodEndDate": "2025-06-30", "unitId": 7}],
                "number": 0, "totalPages": 1, "totalElements": 1
            })))
            .mount(&server)
            .await;

        let store = MemoryTokenStore::with_token("tok");
        let ctx = AppContext::new(config(&server), Arc::new(store)).unwrap();
        assert!(ctx.restore().await);
        let _observers = ctx.spawn_observers();

        ctx.navigator()
            .push(Location::parse("/water-consumption?unitId=3&page=0"));

        tokio::time::timeout(Duration::from_secs(2), async {
            while ctx.water.entries().is_empty() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();
        assert_eq!(ctx.water.entries()[0].unit_id, Some(7));
        assert_eq!(ctx.water.filter().unit_id, Some(3));
    }
}
