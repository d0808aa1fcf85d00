//! # Dashboard State
//!
//! One focused store per view instead of a single app-wide struct:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  QueryStore<VehicleEntry>  QueryStore<WaterEntry>   ... x4 categories   │
//! │    • page of entries         • filter + cursor                          │
//! │    • loading / error         • mirrored into the location               │
//! │                                                                         │
//! │  MetricsStore    UserStore      UnitsStore        DashboardStore        │
//! │    • per-cat.      • admin        • cached once     • statistics        │
//! │      metrics         pages                          • activity log      │
//! │                                                     • recent activity   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every operation clears the store's error when it starts, never returns
//! an `Err`, and leaves a user-facing message in `error()` when it fails.
//! The loading flag is held by an RAII guard so it drops back on every
//! exit path, including cancellation.

pub mod dashboard;
pub mod metrics;
pub mod query;
pub mod units;
pub mod users;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

pub use dashboard::{DashboardStore, StatsSnapshot};
pub use metrics::MetricsStore;
pub use query::{ListOutcome, QuerySnapshot, QueryStore};
pub use units::UnitsStore;
pub use users::UserStore;

/// Count of operations in flight; loading while non-zero.
#[derive(Debug, Clone, Default)]
pub struct LoadingFlag(Arc<AtomicUsize>);

impl LoadingFlag {
    /// Marks an operation as started until the guard drops.
    pub fn start(&self) -> LoadingGuard {
        self.0.fetch_add(1, Ordering::SeqCst);
        LoadingGuard(self.0.clone())
    }

    pub fn is_loading(&self) -> bool {
        self.0.load(Ordering::SeqCst) > 0
    }
}

#[must_use = "loading ends as soon as the guard drops"]
pub struct LoadingGuard(Arc<AtomicUsize>);

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Last user-facing error message of a store.
#[derive(Debug, Default)]
pub struct ErrorSlot(RwLock<Option<String>>);

impl ErrorSlot {
    pub fn get(&self) -> Option<String> {
        self.0.read().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn set(&self, message: impl Into<String>) {
        if let Ok(mut guard) = self.0.write() {
            *guard = Some(message.into());
        }
    }

    pub fn clear(&self) {
        if let Ok(mut guard) = self.0.write() {
            *guard = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loading_flag_counts_overlapping_guards() {
        let flag = LoadingFlag::default();
        let first = flag.start();
        let second = flag.start();
        drop(first);
        assert!(flag.is_loading());
        drop(second);
        assert!(!flag.is_loading());
    }

    #[test]
    fn test_error_slot() {
        let slot = ErrorSlot::default();
        slot.set("Request failed");
        assert_eq!(slot.get().as_deref(), Some("Request failed"));
        slot.clear();
        assert_eq!(slot.get(), None);
    }
}
