//! # campus-client: REST Client for Campus Pulse
//!
//! Everything that crosses the network: configuration, the HTTP wrapper,
//! typed endpoints and the bearer-token session.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Client Architecture                            │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                           Session                                │  │
//! │  │  login / logout / restore      principal profile                 │  │
//! │  └───────────────┬──────────────────────────────┬───────────────────┘  │
//! │                  │ owns                         │ shares (Arc)         │
//! │                  ▼                              ▼                      │
//! │  ┌────────────────────────────┐   ┌───────────────────────────────┐    │
//! │  │        ApiClient           │◄──│  SessionState: AuthProvider   │    │
//! │  │  get / post / put / delete │   │  token slot + TokenStore      │    │
//! │  └──────────────┬─────────────┘   └───────────────────────────────┘    │
//! │                 │ inherent methods                                     │
//! │                 ▼                                                      │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  endpoints: entries • users • metrics • statistics • activity    │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use campus_client::{ClientConfig, Session};
//! use campus_core::{EntryFilter, ListRequest, WaterEntry};
//!
//! let config = ClientConfig::load_or_default(None);
//! let session = Session::open(&config)?;
//! if session.login("admin", "secret").await {
//!     let page = session
//!         .client()
//!         .list_entries::<WaterEntry>(&ListRequest::new(EntryFilter::default(), 0, 10))
//!         .await?;
//!     println!("{} water entries", page.total_elements);
//! }
//! ```

pub mod config;
pub mod endpoints;
pub mod error;
pub mod http;
pub mod session;
pub mod token_store;

pub use config::ClientConfig;
pub use endpoints::{ActivityLogQuery, StatisticsBundle};
pub use error::{ClientError, ClientResult};
pub use http::{ApiBody, ApiClient, AuthProvider};
pub use session::Session;
pub use token_store::{FileTokenStore, MemoryTokenStore, TokenStore};
