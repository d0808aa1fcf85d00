//! Organizational units, fetched once and cached.

use std::sync::RwLock;

use campus_client::ApiClient;
use campus_core::Unit;
use tracing::{debug, warn};

use super::{ErrorSlot, LoadingFlag};

pub struct UnitsStore {
    client: ApiClient,
    /// `None` until the first successful fetch.
    units: RwLock<Option<Vec<Unit>>>,
    loading: LoadingFlag,
    error: ErrorSlot,
}

impl UnitsStore {
    pub fn new(client: ApiClient) -> Self {
        UnitsStore {
            client,
            units: RwLock::new(None),
            loading: LoadingFlag::default(),
            error: ErrorSlot::default(),
        }
    }

    pub fn units(&self) -> Vec<Unit> {
        self.units
            .read()
            .map(|u| u.clone().unwrap_or_default())
            .unwrap_or_default()
    }

    pub fn unit_name(&self, id: i64) -> Option<String> {
        self.units().into_iter().find(|u| u.id == id).map(|u| u.name)
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_loading()
    }

    pub fn error(&self) -> Option<String> {
        self.error.get()
    }

    fn is_cached(&self) -> bool {
        self.units.read().map(|u| u.is_some()).unwrap_or(false)
    }

    /// Loads units unless they are already cached.
    pub async fn fetch_units(&self) -> bool {
        if self.is_cached() {
            debug!("Units already cached");
            return true;
        }

        let _loading = self.loading.start();
        self.error.clear();

        match self.client.list_units().await {
            Ok(units) => {
                debug!(count = units.len(), "Units fetched");
                if let Ok(mut guard) = self.units.write() {
                    *guard = Some(units);
                }
                true
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch units");
                self.error.set(e.user_message());
                false
            }
        }
    }

    /// Drops the cache and fetches again.
    pub async fn refresh_units(&self) -> bool {
        if let Ok(mut guard) = self.units.write() {
            *guard = None;
        }
        self.fetch_units().await
    }
}
