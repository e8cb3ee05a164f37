//! # Validation Module
//!
//! Input validation for the two sale creation paths.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP extractor (apps/api)                                    │
//! │  ├── Type validation (JSON deserialization)                            │
//! │  └── Bearer token → RequestContext                                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Coordinator (apps/api services)                              │
//! │  └── THIS MODULE: shape and range rules, before any transaction        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (qty > 0, subtotal = qty * price_at_purchase)               │
//! │  ├── UNIQUE (invoice_number)                                           │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use niaga_core::validation::{validate_quantity, validate_customer_name};
//!
//! validate_quantity(2).unwrap();
//! assert_eq!(validate_customer_name("  Budi ").unwrap(), "Budi");
//! ```

use crate::error::ValidationError;
use crate::{MAX_DESCRIPTION_LEN, MAX_HEADER_FIELD_LEN, MAX_INVOICE_NUMBER_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line item quantity.
///
/// ## Rules
/// - Must be positive (> 0)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "qty".to_string(),
        });
    }

    Ok(())
}

/// Validates a unit price in the smallest currency unit.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (complimentary items on a manual invoice)
pub fn validate_price(amount: i64) -> ValidationResult<()> {
    if amount < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "price".to_string(),
        });
    }

    Ok(())
}

/// Validates a product reference.
pub fn validate_product_id(product_id: i64) -> ValidationResult<()> {
    if product_id <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "productId".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates the customer name of a manual invoice.
///
/// ## Returns
/// The trimmed name.
pub fn validate_customer_name(name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "customer_name".to_string(),
        });
    }

    check_len("customer_name", name, MAX_HEADER_FIELD_LEN)?;
    Ok(name.to_string())
}

/// Normalizes an optional free-text header field.
///
/// Blank values collapse to `None`, anything else is trimmed.
///
/// ## Example
/// ```rust
/// use niaga_core::validation::normalize_optional_text;
///
/// assert_eq!(normalize_optional_text("customer_phone", Some("   "), 255).unwrap(), None);
/// assert_eq!(
///     normalize_optional_text("customer_phone", Some(" 0812 "), 255).unwrap(),
///     Some("0812".to_string())
/// );
/// ```
pub fn normalize_optional_text(
    field: &str,
    value: Option<&str>,
    max: usize,
) -> ValidationResult<Option<String>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => {
            check_len(field, v, max)?;
            Ok(Some(v.to_string()))
        }
    }
}

/// Shorthand for header fields limited to [`MAX_HEADER_FIELD_LEN`].
pub fn normalize_header_field(field: &str, value: Option<&str>) -> ValidationResult<Option<String>> {
    normalize_optional_text(field, value, MAX_HEADER_FIELD_LEN)
}

/// Shorthand for the manual invoice description.
pub fn normalize_description(value: Option<&str>) -> ValidationResult<Option<String>> {
    normalize_optional_text("description", value, MAX_DESCRIPTION_LEN)
}

/// Validates an admin-supplied invoice number.
///
/// ## Returns
/// - `Ok(None)` when the value is absent or blank (auto-generate)
/// - `Ok(Some(trimmed))` otherwise
pub fn validate_invoice_number(value: Option<&str>) -> ValidationResult<Option<String>> {
    normalize_optional_text("invoice_number", value, MAX_INVOICE_NUMBER_LEN)
}

fn check_len(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }
    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a sale's external identifier.
///
/// ## Example
/// ```rust
/// use niaga_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(1_000).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-3).is_err());
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price(0).is_ok());
        assert!(validate_price(40_000).is_ok());
        assert!(matches!(
            validate_price(-1),
            Err(ValidationError::MustNotBeNegative { .. })
        ));
    }

    #[test]
    fn test_validate_customer_name() {
        assert_eq!(validate_customer_name("Budi").unwrap(), "Budi");
        assert!(matches!(
            validate_customer_name("   "),
            Err(ValidationError::Required { .. })
        ));
        assert!(validate_customer_name(&"B".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_invoice_number() {
        assert_eq!(validate_invoice_number(None).unwrap(), None);
        assert_eq!(validate_invoice_number(Some("  ")).unwrap(), None);
        assert_eq!(
            validate_invoice_number(Some(" INV-001 ")).unwrap(),
            Some("INV-001".to_string())
        );
        assert!(matches!(
            validate_invoice_number(Some(&"9".repeat(101))),
            Err(ValidationError::TooLong { max: 100, .. })
        ));
    }

    #[test]
    fn test_normalize_description() {
        assert_eq!(normalize_description(Some("")).unwrap(), None);
        assert!(normalize_description(Some(&"x".repeat(2001))).is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("").is_err());
        assert!(validate_uuid("123").is_err());
    }
}
