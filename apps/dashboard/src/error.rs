//! # App Error Type
//!
//! Unified error type handed to the view layer.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Campus Pulse                           │
//! │                                                                         │
//! │  View                        Rust State Layer                           │
//! │  ────                        ────────────────                           │
//! │                                                                         │
//! │  water.create(entry)                                                    │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Store operation                                                 │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  ApiClient ─── ClientError::Api { 400, "Date required" } ──┐     │  │
//! │  │         │                                                  │     │  │
//! │  │         ▼                                                  ▼     │  │
//! │  │  store.error = Some("Date required")        AppError { code,     │  │
//! │  │  returns false                                message }          │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  Stores keep the message; startup and the binary surface AppError.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use campus_client::ClientError;
use campus_core::CoreError;
use serde::Serialize;

/// Error surfaced to the view layer.
///
/// ```json
/// {
///   "code": "UNAUTHORIZED",
///   "message": "Session expired. Please log in again."
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes the view branches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input rejected before any request was sent
    ValidationError,

    /// 401 or a token the server no longer accepts
    Unauthorized,

    /// 403
    Forbidden,

    /// 404
    NotFound,

    /// Any other non-2xx response
    ServerError,

    /// The request never got a response
    NetworkError,

    /// Operation the category does not offer (e.g. electricity delete)
    NotSupported,

    /// Bad or unreadable configuration
    ConfigError,

    Internal,
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        AppError {
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::Internal, message)
    }
}

impl From<ClientError> for AppError {
    fn from(err: ClientError) -> Self {
        let code = match &err {
            ClientError::Validation(_) => ErrorCode::ValidationError,
            ClientError::Core(CoreError::DeleteNotSupported(_)) => ErrorCode::NotSupported,
            ClientError::Core(_) => ErrorCode::ValidationError,
            ClientError::Transport(_) => ErrorCode::NetworkError,
            ClientError::Decode(_) | ClientError::Serialization(_) => {
                tracing::error!(error = %err, "Unreadable API payload");
                ErrorCode::Internal
            }
            ClientError::TokenStore(_) => ErrorCode::Internal,
            e if e.is_auth_error() => ErrorCode::Unauthorized,
            e if e.is_config_error() => ErrorCode::ConfigError,
            e => match e.status() {
                Some(403) => ErrorCode::Forbidden,
                Some(404) => ErrorCode::NotFound,
                _ => ErrorCode::ServerError,
            },
        };
        AppError::new(code, err.user_message())
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        ClientError::from(err).into()
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_core::{Category, ValidationError};

    #[test]
    fn test_client_errors_map_to_codes() {
        let err: AppError = ClientError::SessionExpired.into();
        assert_eq!(err.code, ErrorCode::Unauthorized);

        let err: AppError = ClientError::Api {
            status: 404,
            message: "User not found".into(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "User not found");

        let err: AppError = ClientError::Transport("connection refused".into()).into();
        assert_eq!(err.code, ErrorCode::NetworkError);
    }

    #[test]
    fn test_unsupported_delete_is_its_own_code() {
        let err: AppError = CoreError::DeleteNotSupported(Category::Electricity).into();
        assert_eq!(err.code, ErrorCode::NotSupported);
    }

    #[test]
    fn test_validation_serializes_screaming_case() {
        let err: AppError = ClientError::Validation(ValidationError::EmptyField { field: "username" }).into();
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "VALIDATION_ERROR");
    }
}
