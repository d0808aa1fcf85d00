//! # Error Types
//!
//! Domain-specific error types for campus-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  campus-core errors (this file)                                        │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  campus-client errors (separate crate)                                 │
//! │  └── ClientError      - Transport / API / session failures             │
//! │                                                                         │
//! │  Dashboard stores                                                      │
//! │  └── error: Option<String> - What the view renders                     │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ClientError → store error string  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::types::Category;

// =============================================================================
// Core Error
// =============================================================================

/// Core domain errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Input validation failed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A category name did not match any tracked category.
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    /// The category's REST resource has no DELETE endpoint.
    #[error("Deleting {0} entries is not supported")]
    DeleteNotSupported(Category),

    /// A statistics period name was not recognized.
    #[error("Unknown statistics period: {0}")]
    UnknownPeriod(String),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Each variant carries the offending field so the message can be shown
/// next to the form control that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field was empty or whitespace.
    #[error("{field} is required")]
    EmptyField { field: &'static str },

    /// Start date is after end date.
    #[error("Start date {start} is after end date {end}")]
    InvalidDateRange { start: String, end: String },

    /// Requested page is outside the server-reported page count.
    #[error("Page {page} is out of range (total pages: {total_pages})")]
    PageOutOfRange { page: u32, total_pages: u32 },

    /// Page size outside the accepted range.
    #[error("Page size must be between 1 and {max}, got {size}")]
    InvalidPageSize { size: u32, max: u32 },

    /// A field had the wrong format.
    #[error("Invalid {field}: {reason}")]
    InvalidFormat { field: &'static str, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_names_field() {
        let err = ValidationError::EmptyField { field: "username" };
        assert_eq!(err.to_string(), "username is required");
    }

    #[test]
    fn test_core_error_wraps_validation() {
        let err: CoreError = ValidationError::PageOutOfRange {
            page: 4,
            total_pages: 2,
        }
        .into();
        assert!(err.to_string().contains("Page 4"));
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_delete_not_supported_display() {
        let err = CoreError::DeleteNotSupported(Category::Electricity);
        assert_eq!(err.to_string(), "Deleting electricity entries is not supported");
    }
}
