//! # Campus Pulse Dashboard Entry Point
//!
//! Headless runner for the dashboard state layer.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Campus Pulse Dashboard                           │
//! │                                                                         │
//! │  main.rs ────► tokio runtime                                            │
//! │                                                                         │
//! │  lib.rs ─────► logging, config, session restore, home view              │
//! │                                                                         │
//! │  state/ ─────► QueryStore x4, Metrics, Users, Units, Dashboard          │
//! │                              │                                          │
//! │                              ▼                                          │
//! │                 REST API (http://localhost:8080/api)                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Environment: `CAMPUS_API_URL`, `CAMPUS_USERNAME`, `CAMPUS_PASSWORD`,
//! `CAMPUS_STATS_PERIOD`, `RUST_LOG`.

#[tokio::main]
async fn main() -> Result<(), campus_dashboard_lib::AppError> {
    // The actual setup is in lib.rs for testability
    campus_dashboard_lib::run().await
}
