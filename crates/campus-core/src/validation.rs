//! # Validation Module
//!
//! Input validation that runs before a request leaves the client.
//!
//! ## Validation Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Layer 1: View (form controls)       - required fields, input types    │
//! │  Layer 2: Stores (THIS MODULE)       - ranges, bounds, blank strings   │
//! │  Layer 3: REST API                   - authoritative business rules    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use campus_core::validation::{validate_credentials, validate_page};
//!
//! validate_credentials("admin", "secret").unwrap();
//! assert!(validate_page(3, 2).is_err());
//! ```

use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::MAX_PAGE_SIZE;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates that a present start date is not after a present end date.
///
/// Either bound may be open.
pub fn validate_date_range(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> ValidationResult<()> {
    match (start, end) {
        (Some(s), Some(e)) if s > e => Err(ValidationError::InvalidDateRange {
            start: s.to_string(),
            end: e.to_string(),
        }),
        _ => Ok(()),
    }
}

/// Validates a zero-based page against the server-reported page count.
pub fn validate_page(page: u32, total_pages: u32) -> ValidationResult<()> {
    if page >= total_pages {
        return Err(ValidationError::PageOutOfRange { page, total_pages });
    }
    Ok(())
}

/// Validates a requested page size.
pub fn validate_page_size(size: u32) -> ValidationResult<()> {
    if size == 0 || size > MAX_PAGE_SIZE {
        return Err(ValidationError::InvalidPageSize {
            size,
            max: MAX_PAGE_SIZE,
        });
    }
    Ok(())
}

/// Validates login credentials are not blank.
pub fn validate_credentials(username: &str, password: &str) -> ValidationResult<()> {
    if username.trim().is_empty() {
        return Err(ValidationError::EmptyField { field: "username" });
    }
    if password.is_empty() {
        return Err(ValidationError::EmptyField { field: "password" });
    }
    Ok(())
}

/// Validates a metric key.
///
/// ## Rules
/// - Must not be empty
/// - At most 100 characters
/// - Letters, digits, `_`, `-` and `.` only
pub fn validate_metric_key(key: &str) -> ValidationResult<()> {
    if key.trim().is_empty() {
        return Err(ValidationError::EmptyField { field: "metricKey" });
    }
    if key.len() > 100 {
        return Err(ValidationError::InvalidFormat {
            field: "metricKey",
            reason: "must be at most 100 characters".into(),
        });
    }
    if !key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
    {
        return Err(ValidationError::InvalidFormat {
            field: "metricKey",
            reason: "only letters, digits, '_', '-' and '.' are allowed".into(),
        });
    }
    Ok(())
}
