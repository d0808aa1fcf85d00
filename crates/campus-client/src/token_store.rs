//! # Token Storage
//!
//! Where the bearer token lives between runs. The session only talks to the
//! [`TokenStore`] trait; callers pick the backing.

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::debug;

use crate::error::{ClientError, ClientResult};

/// Persistent slot for at most one bearer token.
pub trait TokenStore: Send + Sync {
    /// The stored token, if any.
    fn load(&self) -> ClientResult<Option<String>>;

    /// Replaces the stored token.
    fn save(&self, token: &str) -> ClientResult<()>;

    /// Removes the stored token. Clearing an empty store is not an error.
    fn clear(&self) -> ClientResult<()>;
}

// =============================================================================
// File-backed store
// =============================================================================

/// Keeps the token in a single file.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileTokenStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> ClientResult<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ClientError::TokenStore(e.to_string())),
        }
    }

    fn save(&self, token: &str) -> ClientResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ClientError::TokenStore(e.to_string()))?;
        }
        std::fs::write(&self.path, token).map_err(|e| ClientError::TokenStore(e.to_string()))?;
        debug!(path = ?self.path, "Token persisted");
        Ok(())
    }

    fn clear(&self) -> ClientResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ClientError::TokenStore(e.to_string())),
        }
    }
}

// =============================================================================
// In-memory store
// =============================================================================

/// Process-lifetime store, used when persistence is disabled and in tests.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `token`, as if left over from a prior run.
    pub fn with_token(token: impl Into<String>) -> Self {
        MemoryTokenStore {
            token: RwLock::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> ClientResult<Option<String>> {
        self.token
            .read()
            .map(|t| t.clone())
            .map_err(|e| ClientError::TokenStore(e.to_string()))
    }

    fn save(&self, token: &str) -> ClientResult<()> {
        let mut guard = self
            .token
            .write()
            .map_err(|e| ClientError::TokenStore(e.to_string()))?;
        *guard = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> ClientResult<()> {
        let mut guard = self
            .token
            .write()
            .map_err(|e| ClientError::TokenStore(e.to_string()))?;
        *guard = None;
        Ok(())
    }
}
