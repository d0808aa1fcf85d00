//! # Client Configuration
//!
//! Where the API lives, how long to wait for it, where the token is kept and
//! how big list pages are.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     CAMPUS_API_URL=https://pulse.example.edu/api                       │
//! │     CAMPUS_API_TIMEOUT_SECS=30                                         │
//! │     CAMPUS_TOKEN_FILE=/run/user/1000/campus-token                      │
//! │     CAMPUS_PAGE_SIZE=25                                                │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/campus-pulse/dashboard.toml (Linux)                      │
//! │     ~/Library/Application Support/edu.campus.pulse/dashboard.toml      │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     http://localhost:8080/api, no timeout, page size 10                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # dashboard.toml
//! [api]
//! base_url = "http://localhost:8080/api"
//! timeout_secs = 30
//!
//! [session]
//! persist_token = true
//!
//! [lists]
//! page_size = 10
//! activity_log_page_size = 20
//! recent_activity_limit = 5
//! ```

use std::path::PathBuf;
use std::time::Duration;

use campus_core::{ACTIVITY_LOG_PAGE_SIZE, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, RECENT_ACTIVITY_LIMIT};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{ClientError, ClientResult};

/// Base URL used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";

const CONFIG_FILE_NAME: &str = "dashboard.toml";
const TOKEN_FILE_NAME: &str = "token";

// =============================================================================
// API Settings
// =============================================================================

/// REST endpoint settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Base URL every request path is appended to.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout. Unset means the transport default (none).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            base_url: default_base_url(),
            timeout_secs: None,
        }
    }
}

// =============================================================================
// Session Settings
// =============================================================================

/// Token persistence settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Keep the token on disk so it survives a restart.
    #[serde(default = "default_true")]
    pub persist_token: bool,

    /// Token file; defaults to the platform data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_file: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

impl Default for SessionSettings {
    fn default() -> Self {
        SessionSettings {
            persist_token: true,
            token_file: None,
        }
    }
}

// =============================================================================
// List Settings
// =============================================================================

/// Page sizes and feed length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListSettings {
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    #[serde(default = "default_activity_log_page_size")]
    pub activity_log_page_size: u32,

    #[serde(default = "default_recent_activity_limit")]
    pub recent_activity_limit: usize,
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_activity_log_page_size() -> u32 {
    ACTIVITY_LOG_PAGE_SIZE
}

fn default_recent_activity_limit() -> usize {
    RECENT_ACTIVITY_LIMIT
}

impl Default for ListSettings {
    fn default() -> Self {
        ListSettings {
            page_size: default_page_size(),
            activity_log_page_size: default_activity_log_page_size(),
            recent_activity_limit: default_recent_activity_limit(),
        }
    }
}

// =============================================================================
// Main Client Configuration
// =============================================================================

/// Complete client configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub session: SessionSettings,

    #[serde(default)]
    pub lists: ListSettings,
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults pointed at `base_url`; handy for tests and one-off tools.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let mut config = Self::default();
        config.api.base_url = base_url.into();
        config
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (dashboard.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ClientResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading client config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load client config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ClientResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ClientError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ClientError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| ClientError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Client config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ClientResult<()> {
        let url = url::Url::parse(&self.api.base_url)?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ClientError::InvalidUrl(format!(
                "Base URL must start with http:// or https://, got: {}",
                self.api.base_url
            )));
        }

        if self.api.timeout_secs == Some(0) {
            return Err(ClientError::InvalidConfig(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        for (name, size) in [
            ("page_size", self.lists.page_size),
            ("activity_log_page_size", self.lists.activity_log_page_size),
        ] {
            if size == 0 || size > MAX_PAGE_SIZE {
                return Err(ClientError::InvalidConfig(format!(
                    "{} must be between 1 and {}, got {}",
                    name, MAX_PAGE_SIZE, size
                )));
            }
        }

        Ok(())
    }

    /// Applies `CAMPUS_*` overrides read through `lookup`.
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("CAMPUS_API_URL") {
            debug!(url = %url, "Overriding API URL from environment");
            self.api.base_url = url;
        }

        if let Some(secs) = lookup("CAMPUS_API_TIMEOUT_SECS") {
            match secs.parse::<u64>() {
                Ok(s) => self.api.timeout_secs = Some(s),
                Err(_) => warn!(value = %secs, "Ignoring non-numeric CAMPUS_API_TIMEOUT_SECS"),
            }
        }

        if let Some(path) = lookup("CAMPUS_TOKEN_FILE") {
            self.session.token_file = Some(PathBuf::from(path));
        }

        if let Some(flag) = lookup("CAMPUS_PERSIST_TOKEN") {
            self.session.persist_token = flag != "false" && flag != "0";
        }

        if let Some(size) = lookup("CAMPUS_PAGE_SIZE") {
            if let Ok(s) = size.parse::<u32>() {
                debug!(page_size = s, "Overriding page size from environment");
                self.lists.page_size = s;
            }
        }
    }

    fn project_dirs() -> Option<directories::ProjectDirs> {
        directories::ProjectDirs::from("edu", "campus", "pulse")
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    pub fn base_url(&self) -> &str {
        &self.api.base_url
    }

    /// Configured request timeout.
    pub fn timeout(&self) -> Option<Duration> {
        self.api.timeout_secs.map(Duration::from_secs)
    }

    /// Where the token is persisted, if persistence is on.
    pub fn token_path(&self) -> Option<PathBuf> {
        if !self.session.persist_token {
            return None;
        }
        self.session.token_file.clone().or_else(|| {
            Self::project_dirs().map(|dirs| dirs.data_dir().join(TOKEN_FILE_NAME))
        })
    }
}
