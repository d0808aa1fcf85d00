//! # Campus Pulse Dashboard Library
//!
//! State layer of the campus sustainability dashboard. A view layer (or the
//! bundled binary) builds one [`AppContext`] and drives the stores it owns.
//!
//! ## Module Organization
//! ```text
//! campus_dashboard_lib/
//! ├── lib.rs          ◄─── You are here (startup & logging)
//! ├── context.rs      ◄─── AppContext: owns config, session, stores
//! ├── location.rs     ◄─── Navigable location + history
//! ├── aggregator.rs   ◄─── Cross-category recent activity
//! ├── state/
//! │   ├── mod.rs      ◄─── Loading guard, error slot, exports
//! │   ├── query.rs    ◄─── QueryStore<E> for the four entry categories
//! │   ├── metrics.rs  ◄─── Campus metrics
//! │   ├── users.rs    ◄─── User administration
//! │   ├── units.rs    ◄─── Organizational units (cached)
//! │   └── dashboard.rs◄─── Statistics + activity log
//! └── error.rs        ◄─── AppError for the view layer
//! ```

pub mod aggregator;
pub mod context;
pub mod error;
pub mod location;
pub mod state;

pub use aggregator::{ActivityAggregator, AggregateError, AggregateReport, JoinPolicy};
pub use context::AppContext;
pub use error::{AppError, ErrorCode};
pub use location::{Location, Navigator};

use campus_client::ClientConfig;
use campus_core::{ActivityItem, StatsPeriod};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// What the bundled binary prints after startup.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StartupSummary {
    user: Option<String>,
    stats: Option<state::StatsSnapshot>,
    recent_activity: Vec<ActivityItem>,
    error: Option<String>,
}

/// Runs the dashboard headless: restore or open a session, load the home
/// view, print it as JSON.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                       Application Startup                               │
/// │                                                                         │
/// │  1. Initialize Logging ───────────────────────────────────────────────► │
/// │     • tracing-subscriber with env filter                                │
/// │     • Default: info,campus=debug; RUST_LOG overrides                    │
/// │                                                                         │
/// │  2. Load Configuration ───────────────────────────────────────────────► │
/// │     • defaults → dashboard.toml → CAMPUS_* environment                  │
/// │                                                                         │
/// │  3. Restore Session ──────────────────────────────────────────────────► │
/// │     • persisted token → GET /users/me                                   │
/// │     • else CAMPUS_USERNAME / CAMPUS_PASSWORD login, if set              │
/// │                                                                         │
/// │  4. Start Observers + Load Home ──────────────────────────────────────► │
/// │     • statistics and recent activity, concurrently                      │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run() -> Result<(), AppError> {
    init_tracing();

    info!("Starting Campus Pulse dashboard");

    let config = ClientConfig::load_or_default(None);
    let ctx = AppContext::open(config)?;

    if !ctx.restore().await {
        login_from_env(&ctx).await?;
    }

    let _observers = ctx.spawn_observers();

    let period = std::env::var("CAMPUS_STATS_PERIOD")
        .ok()
        .and_then(|p| p.parse::<StatsPeriod>().ok())
        .unwrap_or_default();
    if !ctx.refresh_dashboard(period).await {
        warn!(error = ?ctx.dashboard.error(), "Dashboard loaded with errors");
    }

    let summary = StartupSummary {
        user: ctx.principal().map(|p| p.username),
        stats: ctx.dashboard.stats(),
        recent_activity: ctx.dashboard.recent_activity(),
        error: ctx.dashboard.error(),
    };
    let json = serde_json::to_string_pretty(&summary)
        .map_err(|e| AppError::internal(e.to_string()))?;
    println!("{}", json);
    Ok(())
}

async fn login_from_env(ctx: &AppContext) -> Result<(), AppError> {
    let (Ok(username), Ok(password)) = (
        std::env::var("CAMPUS_USERNAME"),
        std::env::var("CAMPUS_PASSWORD"),
    ) else {
        info!("No session; continuing with public statistics only");
        return Ok(());
    };

    if ctx.session().login(&username, &password).await {
        Ok(())
    } else {
        Err(AppError::new(
            ErrorCode::Unauthorized,
            ctx.session()
                .error()
                .unwrap_or_else(|| "Login failed".to_string()),
        ))
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=campus=trace` - Show trace for campus crates only
/// - Default: `info,campus=debug`
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,campus=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
