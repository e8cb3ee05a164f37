//! # Error Types
//!
//! Domain-specific error types for niaga-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  niaga-core errors (this file)                                         │
//! │  ├── CoreError        - Business rule failures (not found, forbidden)  │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  niaga-db errors (separate crate)                                      │
//! │  └── DbError          - Database failures (unique, FK, pool, ...)      │
//! │                                                                         │
//! │  HTTP errors (apps/api)                                                │
//! │  └── ApiError         - What clients see (code + message)              │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError ← DbError                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A line item references a product the catalog cannot find.
    #[error("Product ID {0} not found")]
    ProductNotFound(i64),

    /// No sale exists under the given external identifier.
    #[error("Sale not found: {0}")]
    SaleNotFound(String),

    /// Role or ownership check failed.
    ///
    /// ## When This Occurs
    /// - Non-admin creating a manual invoice
    /// - Customer reading somebody else's sale
    /// - Non-admin reading a sale without an owning user
    #[error("Forbidden: {reason}")]
    Forbidden { reason: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a Forbidden error.
    pub fn forbidden(reason: impl Into<String>) -> Self {
        CoreError::Forbidden {
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when request input doesn't meet requirements.
/// They are always raised before any database work starts.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., invalid date, non-numeric price).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// A sale needs at least one line item.
    #[error("a sale needs at least one line item")]
    EmptySale,

    /// Arithmetic on a monetary amount left the representable range.
    #[error("{field} is too large")]
    AmountOverflow { field: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
