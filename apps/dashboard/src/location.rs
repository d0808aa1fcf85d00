//! # Navigable Location
//!
//! The address bar of the dashboard: a path plus query parameters, with a
//! browser-style history. List stores write their filter and page here and
//! react when it changes, so a location is always enough to rebuild a view.
//!
//! ```text
//!   store.apply_filter(f) ──push──► Navigator ──watch──► observer task
//!                                      │                      │
//!                                 back / forward              ▼
//!                                      │           store.init_from_location
//!                                      └──────────────────────┘
//! ```

use std::future::Future;
use std::sync::{Arc, RwLock};

use campus_core::query::{parse_query_string, to_query_string};
use campus_core::QueryMap;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// A path with its query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Location {
    pub path: String,
    pub query: QueryMap,
}

impl Location {
    pub fn new(path: impl Into<String>) -> Self {
        Location {
            path: path.into(),
            query: QueryMap::new(),
        }
    }

    pub fn with_query(mut self, query: QueryMap) -> Self {
        self.query = query;
        self
    }

    /// Splits `/water-consumption?page=1` into path and query.
    pub fn parse(href: &str) -> Self {
        match href.split_once('?') {
            Some((path, raw)) => Location {
                path: path.to_string(),
                query: parse_query_string(raw),
            },
            None => Location::new(href),
        }
    }

    /// Path plus `?query` when any parameters are set.
    pub fn href(&self) -> String {
        if self.query.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, to_query_string(&self.query))
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.href())
    }
}

#[derive(Debug)]
struct History {
    entries: Vec<Location>,
    index: usize,
}

struct NavigatorInner {
    history: RwLock<History>,
    tx: watch::Sender<Location>,
}

/// Shared handle to the current location and its history.
#[derive(Clone)]
pub struct Navigator {
    inner: Arc<NavigatorInner>,
}

impl std::fmt::Debug for Navigator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Navigator")
            .field("current", &self.current())
            .finish()
    }
}

impl Navigator {
    pub fn new(start: Location) -> Self {
        let (tx, _rx) = watch::channel(start.clone());
        Navigator {
            inner: Arc::new(NavigatorInner {
                history: RwLock::new(History {
                    entries: vec![start],
                    index: 0,
                }),
                tx,
            }),
        }
    }

    pub fn current(&self) -> Location {
        self.inner.tx.borrow().clone()
    }

    /// Navigates to `location`, dropping any forward history.
    ///
    /// Pushing the current location again is a no-op and returns `false`.
    pub fn push(&self, location: Location) -> bool {
        if location == self.current() {
            trace!(%location, "Already at location");
            return false;
        }
        if let Ok(mut history) = self.inner.history.write() {
            let keep = history.index + 1;
            history.entries.truncate(keep);
            history.entries.push(location.clone());
            history.index = history.entries.len() - 1;
        }
        debug!(%location, "Navigate");
        self.inner.tx.send_replace(location);
        true
    }

    /// Swaps the current history entry without adding a new one.
    pub fn replace(&self, location: Location) {
        if let Ok(mut history) = self.inner.history.write() {
            let index = history.index;
            history.entries[index] = location.clone();
        }
        debug!(%location, "Replace location");
        self.inner.tx.send_replace(location);
    }

    pub fn back(&self) -> bool {
        self.step(-1)
    }

    pub fn forward(&self) -> bool {
        self.step(1)
    }

    fn step(&self, delta: isize) -> bool {
        let target = {
            let Ok(mut history) = self.inner.history.write() else {
                return false;
            };
            let Some(index) = history.index.checked_add_signed(delta) else {
                return false;
            };
            if index >= history.entries.len() {
                return false;
            }
            history.index = index;
            history.entries[index].clone()
        };
        debug!(location = %target, "History step");
        self.inner.tx.send_replace(target);
        true
    }

    /// Receiver that sees every location change.
    pub fn subscribe(&self) -> watch::Receiver<Location> {
        self.inner.tx.subscribe()
    }

    /// Runs `handler` for the current location and every later one whose
    /// path is `route`.
    ///
    /// Changes that arrive while a handler is running are coalesced into
    /// the latest one. Abort the returned handle to stop observing.
    pub fn observe<F, Fut>(&self, route: &'static str, mut handler: F) -> JoinHandle<()>
    where
        F: FnMut(Location) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut rx = self.subscribe();
        tokio::spawn(async move {
            loop {
                let location = rx.borrow_and_update().clone();
                if location.path == route {
                    handler(location).await;
                }
                if rx.changed().await.is_err() {
                    trace!(route, "Navigator dropped, observer stops");
                    break;
                }
            }
        })
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Navigator::new(Location::new("/"))
    }
}
