//! # Session
//!
//! Owns the bearer token and the authenticated principal's profile.
//!
//! ## Login Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           Session Lifecycle                             │
//! │                                                                         │
//! │  ┌────────────┐   POST /auth/login    ┌─────────────┐                   │
//! │  │  Session   │──────────────────────►│  REST API   │                   │
//! │  │            │◄──────────────────────│             │                   │
//! │  │            │   raw text token      │             │                   │
//! │  │            │                       │             │                   │
//! │  │ persist ──►│ TokenStore            │             │                   │
//! │  │            │   GET /users/me       │             │                   │
//! │  │            │──────────────────────►│             │                   │
//! │  │            │◄──────────────────────│             │                   │
//! │  │            │   principal profile   │             │                   │
//! │  └────────────┘                       └─────────────┘                   │
//! │                                                                         │
//! │  Any later 401 on a request carrying the token:                         │
//! │    ApiClient ──reject(token)──► SessionState::clear ──► logged out      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The token is never validated locally; only the server decides it is stale.

use std::sync::{Arc, RwLock};

use campus_core::validation::validate_credentials;
use campus_core::Principal;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::http::{ApiClient, AuthProvider};
use crate::token_store::{FileTokenStore, MemoryTokenStore, TokenStore};

#[derive(Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
}

// =============================================================================
// Shared session state
// =============================================================================

/// Token + principal shared between the session and the HTTP client.
pub struct SessionState {
    token: RwLock<Option<String>>,
    principal: RwLock<Option<Principal>>,
    store: Arc<dyn TokenStore>,
}

impl SessionState {
    fn new(store: Arc<dyn TokenStore>) -> Self {
        let token = store.load().unwrap_or_else(|e| {
            warn!(error = %e, "Could not read persisted token, starting logged out");
            None
        });
        if token.is_some() {
            debug!("Found persisted token");
        }
        SessionState {
            token: RwLock::new(token),
            principal: RwLock::new(None),
            store,
        }
    }

    fn token(&self) -> Option<String> {
        self.token.read().map(|t| t.clone()).unwrap_or_default()
    }

    fn principal(&self) -> Option<Principal> {
        self.principal.read().map(|p| p.clone()).unwrap_or_default()
    }

    fn set_token(&self, token: String) {
        if let Err(e) = self.store.save(&token) {
            warn!(error = %e, "Failed to persist token; session will not survive a restart");
        }
        if let Ok(mut guard) = self.token.write() {
            *guard = Some(token);
        }
    }

    fn set_principal(&self, principal: Option<Principal>) {
        if let Ok(mut guard) = self.principal.write() {
            *guard = principal;
        }
    }

    /// Drops the token, its persisted copy and the cached profile.
    fn clear(&self) {
        if let Ok(mut guard) = self.token.write() {
            *guard = None;
        }
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Failed to remove persisted token");
        }
        self.set_principal(None);
    }
}

impl AuthProvider for SessionState {
    fn bearer(&self) -> Option<String> {
        self.token()
    }

    fn reject(&self, token: &str) {
        // A newer login may have replaced the token while the request was in flight.
        if self.token().as_deref() == Some(token) {
            info!("Server rejected the session token, logging out");
            self.clear();
        }
    }
}

// =============================================================================
// Session
// =============================================================================

/// Login/logout and the principal they produce.
pub struct Session {
    client: ApiClient,
    state: Arc<SessionState>,
    error: RwLock<Option<String>>,
}

impl Session {
    /// Creates a session over `store`, picking up any persisted token.
    pub fn new(config: &ClientConfig, store: Arc<dyn TokenStore>) -> ClientResult<Self> {
        let state = Arc::new(SessionState::new(store));
        let client = ApiClient::new(config)?.with_auth(state.clone());
        Ok(Session {
            client,
            state,
            error: RwLock::new(None),
        })
    }

    /// Creates a session with the token store the config asks for.
    pub fn open(config: &ClientConfig) -> ClientResult<Self> {
        let store: Arc<dyn TokenStore> = match config.token_path() {
            Some(path) => {
                debug!(?path, "Using file token store");
                Arc::new(FileTokenStore::new(path))
            }
            None => Arc::new(MemoryTokenStore::new()),
        };
        Self::new(config, store)
    }

    /// Client whose requests carry this session's token.
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn token(&self) -> Option<String> {
        self.state.token()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.token().is_some()
    }

    /// Profile of the logged-in user, once fetched.
    pub fn principal(&self) -> Option<Principal> {
        self.state.principal()
    }

    /// Message from the last failed login.
    pub fn error(&self) -> Option<String> {
        self.error.read().map(|e| e.clone()).unwrap_or_default()
    }

    fn set_error(&self, message: Option<String>) {
        if let Ok(mut guard) = self.error.write() {
            *guard = message;
        }
    }

    /// Exchanges credentials for a token, then loads the profile.
    ///
    /// Never fails: a rejected login leaves the message in [`Session::error`]
    /// and returns `false`. A profile fetch failure after a successful
    /// exchange is logged and the login still counts.
    pub async fn login(&self, username: &str, password: &str) -> bool {
        self.set_error(None);

        match self.exchange(username, password).await {
            Ok(token) => {
                self.state.set_token(token);
                info!(username, "Logged in");
                if let Err(e) = self.fetch_profile().await {
                    warn!(error = %e, "Logged in but the profile could not be loaded");
                }
                true
            }
            Err(e) => {
                warn!(username, error = %e, "Login failed");
                self.set_error(Some(e.user_message()));
                false
            }
        }
    }

    async fn exchange(&self, username: &str, password: &str) -> ClientResult<String> {
        validate_credentials(username, password)?;
        let body = self
            .client
            .post_anonymous("/auth/login", &Credentials { username, password })
            .await?;
        let token = body.into_text().trim().to_string();
        if token.is_empty() {
            return Err(ClientError::Decode("login returned an empty token".into()));
        }
        Ok(token)
    }

    /// Fetches `GET /users/me` and caches it as the principal.
    pub async fn fetch_profile(&self) -> ClientResult<Principal> {
        let principal = self.client.current_user().await?;
        debug!(username = %principal.username, role = ?principal.role, "Profile loaded");
        self.state.set_principal(Some(principal.clone()));
        Ok(principal)
    }

    /// Re-establishes a persisted session on startup.
    ///
    /// Returns `true` when a stored token still yields a profile. A token the
    /// server no longer accepts is discarded.
    pub async fn restore(&self) -> bool {
        if !self.is_authenticated() {
            return false;
        }
        match self.fetch_profile().await {
            Ok(principal) => {
                info!(username = %principal.username, "Session restored");
                true
            }
            Err(e) => {
                warn!(error = %e, "Stored session is no longer valid");
                self.logout();
                false
            }
        }
    }

    /// Clears the token, its persisted copy and the cached profile.
    pub fn logout(&self) {
        self.state.clear();
        info!("Logged out");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_core::Role;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn session(server: &MockServer, store: Arc<dyn TokenStore>) -> Session {
        let config = ClientConfig::with_base_url(format!("{}/api", server.uri()));
        Session::new(&config, store).unwrap()
    }

    async fn mount_profile(server: &MockServer, token: &str) {
        Mock::given(method("GET"))
            .and(path("/api/users/me"))
            .and(header("authorization", format!("Bearer {}", token).as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 9,
                "username": "bina_gorevlisi_1",
                "role": "BUILDING_MANAGER",
                "unitId": 7
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_login_success_persists_token_and_loads_profile() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .and(body_json(json!({"username": "bina_gorevlisi_1", "password": "secret"})))
            .respond_with(ResponseTemplate::new(200).set_body_string("tok-123"))
            .mount(&server)
            .await;
        mount_profile(&server, "tok-123").await;

        let store = Arc::new(MemoryTokenStore::new());
        let session = session(&server, store.clone());

        assert!(session.login("bina_gorevlisi_1", "secret").await);
        assert_eq!(session.token().as_deref(), Some("tok-123"));
        assert_eq!(store.load().unwrap().as_deref(), Some("tok-123"));
        assert_eq!(session.error(), None);

        let principal = session.principal().unwrap();
        assert_eq!(principal.role, Role::BuildingManager);
        assert_eq!(principal.scoped_unit(), Some(7));
    }

    #[tokio::test]
    async fn test_login_invalid_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Invalid credentials"})))
            .mount(&server)
            .await;

        let store = Arc::new(MemoryTokenStore::new());
        let session = session(&server, store.clone());

        assert!(!session.login("admin", "wrong").await);
        assert_eq!(session.error().as_deref(), Some("Invalid credentials"));
        assert_eq!(session.token(), None);
        assert_eq!(store.load().unwrap(), None);
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_blank_credentials_never_hit_the_server() {
        let server = MockServer::start().await;
        let session = session(&server, Arc::new(MemoryTokenStore::new()));

        assert!(!session.login("", "pw").await);
        assert_eq!(session.error().as_deref(), Some("username is required"));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_profile_failure_does_not_fail_login() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_string("tok-1"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/users/me"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let session = session(&server, Arc::new(MemoryTokenStore::new()));
        assert!(session.login("admin", "pw").await);
        assert!(session.is_authenticated());
        assert_eq!(session.principal(), None);
    }

    #[tokio::test]
    async fn test_logout_clears_everything() {
        let server = MockServer::start().await;
        mount_profile(&server, "persisted").await;

        let store = Arc::new(MemoryTokenStore::with_token("persisted"));
        let session = session(&server, store.clone());
        assert!(session.restore().await);
        assert!(session.principal().is_some());

        session.logout();
        assert_eq!(session.token(), None);
        assert_eq!(session.principal(), None);
        assert_eq!(store.load().unwrap(), None);
    }

    #[tokio::test]
    async fn test_restore_discards_rejected_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/users/me"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let store = Arc::new(MemoryTokenStore::with_token("expired"));
        let session = session(&server, store.clone());

        assert!(session.is_authenticated());
        assert!(!session.restore().await);
        assert!(!session.is_authenticated());
        assert_eq!(store.load().unwrap(), None);
    }

    #[tokio::test]
    async fn test_restore_without_token_is_noop() {
        let server = MockServer::start().await;
        let session = session(&server, Arc::new(MemoryTokenStore::new()));
        assert!(!session.restore().await);
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[test]
    fn test_reject_ignores_superseded_token() {
        let state = SessionState::new(Arc::new(MemoryTokenStore::with_token("new")));
        state.reject("old");
        assert_eq!(state.bearer().as_deref(), Some("new"));
        state.reject("new");
        assert_eq!(state.bearer(), None);
    }
}
