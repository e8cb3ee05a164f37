//! # Pricing Module
//!
//! Decides the unit price frozen into every line item, and assembles the
//! priced lines into a [`SaleDraft`] ready to be written.
//!
//! ## Price Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Checkout (any authenticated caller)                                   │
//! │    {productId, qty, price?} ──► LineItemSpec::Catalog                   │
//! │                                  (client price is dropped here)         │
//! │                                                                         │
//! │  Manual invoice (admin only)                                           │
//! │    {productId, qty}            ──► LineItemSpec::Catalog                │
//! │    {productId, qty, price: ""} ──► LineItemSpec::Catalog                │
//! │    {productId, qty, price: 40000} ──► LineItemSpec::Override            │
//! │                                                                         │
//! │  price_line(spec, catalog_price)                                       │
//! │    Catalog  → price_at_purchase = catalog_price                        │
//! │    Override → price_at_purchase = override                             │
//! │    subtotal = qty × price_at_purchase (checked)                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The product must exist in the catalog on both paths, so the catalog price
//! is always looked up even when an override wins.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{ManualInvoiceDetails, SaleStatus};
use crate::validation::{validate_price, validate_product_id, validate_quantity, ValidationResult};

// =============================================================================
// Line Item Spec
// =============================================================================

/// One requested line of a sale, before pricing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineItemSpec {
    /// Priced from the catalog at creation time.
    Catalog { product_id: i64, qty: i64 },

    /// Priced from an admin-supplied value.
    Override {
        product_id: i64,
        qty: i64,
        price: Money,
    },
}

impl LineItemSpec {
    pub fn catalog(product_id: i64, qty: i64) -> Self {
        LineItemSpec::Catalog { product_id, qty }
    }

    pub fn with_price(product_id: i64, qty: i64, price: Money) -> Self {
        LineItemSpec::Override {
            product_id,
            qty,
            price,
        }
    }

    #[inline]
    pub fn product_id(&self) -> i64 {
        match *self {
            LineItemSpec::Catalog { product_id, .. } | LineItemSpec::Override { product_id, .. } => {
                product_id
            }
        }
    }

    #[inline]
    pub fn qty(&self) -> i64 {
        match *self {
            LineItemSpec::Catalog { qty, .. } | LineItemSpec::Override { qty, .. } => qty,
        }
    }

    /// The admin-supplied price, if any.
    pub fn override_price(&self) -> Option<Money> {
        match *self {
            LineItemSpec::Catalog { .. } => None,
            LineItemSpec::Override { price, .. } => Some(price),
        }
    }

    /// Checks the shape of the line without touching the catalog.
    pub fn validate(&self) -> ValidationResult<()> {
        validate_product_id(self.product_id())?;
        validate_quantity(self.qty())?;
        if let Some(price) = self.override_price() {
            validate_price(price.amount())?;
        }
        Ok(())
    }
}

// =============================================================================
// Manual Price Input
// =============================================================================

/// The loosely typed `price` field of a manual invoice line.
///
/// Admin forms submit either a number or a string; an empty string means
/// "use the catalog price".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(untagged)]
#[ts(export)]
pub enum PriceInput {
    Amount(i64),
    Text(String),
}

impl PriceInput {
    /// Resolves the input into an override price.
    ///
    /// ## Example
    /// ```rust
    /// use niaga_core::money::Money;
    /// use niaga_core::pricing::PriceInput;
    ///
    /// assert_eq!(PriceInput::Text(" ".into()).resolve().unwrap(), None);
    /// assert_eq!(
    ///     PriceInput::Text("40000".into()).resolve().unwrap(),
    ///     Some(Money::from_minor(40_000))
    /// );
    /// assert!(PriceInput::Text("abc".into()).resolve().is_err());
    /// ```
    pub fn resolve(&self) -> ValidationResult<Option<Money>> {
        let amount = match self {
            PriceInput::Amount(v) => *v,
            PriceInput::Text(s) => {
                let s = s.trim();
                if s.is_empty() {
                    return Ok(None);
                }
                s.parse::<i64>().map_err(|_| ValidationError::InvalidFormat {
                    field: "price".to_string(),
                    reason: "must be a whole number".to_string(),
                })?
            }
        };

        validate_price(amount)?;
        Ok(Some(Money::from_minor(amount)))
    }
}

/// Builds one manual invoice line from its raw inputs.
pub fn manual_line_spec(
    product_id: i64,
    qty: i64,
    price: Option<&PriceInput>,
) -> ValidationResult<LineItemSpec> {
    let spec = match price.map(PriceInput::resolve).transpose()?.flatten() {
        Some(price) => LineItemSpec::with_price(product_id, qty, price),
        None => LineItemSpec::catalog(product_id, qty),
    };
    spec.validate()?;
    Ok(spec)
}

// =============================================================================
// Priced Line
// =============================================================================

/// A line item with its price frozen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricedLine {
    pub product_id: i64,
    pub qty: i64,
    pub price_at_purchase: i64,
    pub subtotal: i64,
}

impl PricedLine {
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_minor(self.subtotal)
    }
}

/// Freezes the unit price of one line.
///
/// `catalog_price` is the product's price at this moment; it is used unless
/// the line carries an override.
pub fn price_line(spec: &LineItemSpec, catalog_price: Money) -> CoreResult<PricedLine> {
    spec.validate()?;

    let unit = spec.override_price().unwrap_or(catalog_price);
    validate_price(unit.amount())?;

    let subtotal = unit
        .checked_mul_qty(spec.qty())
        .ok_or_else(|| ValidationError::AmountOverflow {
            field: "subtotal".to_string(),
        })?;

    Ok(PricedLine {
        product_id: spec.product_id(),
        qty: spec.qty(),
        price_at_purchase: unit.amount(),
        subtotal: subtotal.amount(),
    })
}

/// Σ subtotals, failing instead of wrapping.
pub fn total_of(lines: &[PricedLine]) -> ValidationResult<Money> {
    lines.iter().try_fold(Money::zero(), |acc, line| {
        acc.checked_add(line.subtotal())
            .ok_or_else(|| ValidationError::AmountOverflow {
                field: "total_price".to_string(),
            })
    })
}

// =============================================================================
// Sale Draft
// =============================================================================

/// Header fields resolved by the coordinator before the write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleHeader {
    pub invoice_number: String,
    pub transaction_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub user_id: Option<i64>,
    pub manual: Option<ManualInvoiceDetails>,
}

/// A fully priced sale that has not been written yet.
///
/// Lines and total are only reachable through accessors so a draft always
/// satisfies: at least one line, total = Σ subtotals.
#[derive(Debug, Clone)]
pub struct SaleDraft {
    pub uuid: String,
    pub status: SaleStatus,
    pub header: SaleHeader,
    lines: Vec<PricedLine>,
    total: Money,
}

impl SaleDraft {
    pub fn new(header: SaleHeader, lines: Vec<PricedLine>) -> CoreResult<Self> {
        if lines.is_empty() {
            return Err(ValidationError::EmptySale.into());
        }

        if header.user_id.is_none() && header.manual.is_none() {
            return Err(ValidationError::Required {
                field: "user_id".to_string(),
            }
            .into());
        }

        let total = total_of(&lines)?;

        Ok(SaleDraft {
            uuid: Uuid::new_v4().to_string(),
            status: SaleStatus::Pending,
            header,
            lines,
            total,
        })
    }

    #[inline]
    pub fn lines(&self) -> &[PricedLine] {
        &self.lines
    }

    #[inline]
    pub fn total(&self) -> Money {
        self.total
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
