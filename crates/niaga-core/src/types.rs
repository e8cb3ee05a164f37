//! # Domain Types
//!
//! Core domain types used throughout Niaga.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │    SaleItem     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (INTEGER)   │   │  id (internal)  │   │  sale_id (FK)   │       │
//! │  │  name           │   │  uuid (public)  │   │  product_id(FK) │       │
//! │  │  price          │   │  invoice_number │   │  qty            │       │
//! │  └─────────────────┘   │  total_price    │   │  price_at_purch.│       │
//! │                        │  user_id?       │   │  subtotal       │       │
//! │                        │  customer_*?    │   └─────────────────┘       │
//! │                        └─────────────────┘                              │
//! │                                                                         │
//! │  Read models: SaleSummary (list), SaleDetail (single, with items)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! A sale has:
//! - `id`: sequential INTEGER key, only used for relations, never serialized
//! - `uuid`: opaque external identifier handed to clients

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::context::Role;
use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A catalog product, as far as the sale subsystem cares about it.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    pub id: i64,
    pub uuid: String,
    pub name: String,
    /// Short description, e.g. "1kg" or "Botol 500ml".
    pub description: Option<String>,
    /// Current unit price in the smallest currency unit.
    pub price: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the current catalog price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_minor(self.price)
    }
}

// =============================================================================
// User
// =============================================================================

/// An account known to the authentication collaborator.
///
/// Only the display/contact fields are stored here; credentials live elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub address: Option<String>,
    pub phone: Option<String>,
}

// =============================================================================
// Sale Status
// =============================================================================

/// The status of a sale.
///
/// There is no payment gateway, so every sale starts out pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    #[default]
    Pending,
    Completed,
}

// =============================================================================
// Manual Invoice Details
// =============================================================================

/// Customer fields an admin fills in on a manual invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ManualInvoiceDetails {
    pub customer_name: String,
    pub customer_address: Option<String>,
    pub customer_phone: Option<String>,
    pub description: Option<String>,
}

// =============================================================================
// Sale
// =============================================================================

/// A committed sale header.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    /// Internal sequential key.
    #[serde(skip)]
    pub id: i64,
    /// External identifier.
    pub uuid: String,
    pub invoice_number: String,
    #[ts(as = "String")]
    pub transaction_date: DateTime<Utc>,
    #[ts(as = "String")]
    pub due_date: DateTime<Utc>,
    pub total_price: i64,
    pub status: SaleStatus,
    /// Owning user; the admin-creator for manual invoices. `None` for a pure
    /// manual invoice with no linked account.
    pub user_id: Option<i64>,
    pub customer_name: Option<String>,
    pub customer_address: Option<String>,
    pub customer_phone: Option<String>,
    pub description: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Sale {
    /// Returns the total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_minor(self.total_price)
    }

    /// Returns the manual invoice payload, if this sale carries one.
    pub fn manual_details(&self) -> Option<ManualInvoiceDetails> {
        self.customer_name
            .as_ref()
            .map(|name| ManualInvoiceDetails {
                customer_name: name.clone(),
                customer_address: self.customer_address.clone(),
                customer_phone: self.customer_phone.clone(),
                description: self.description.clone(),
            })
    }
}

// =============================================================================
// Sale Item
// =============================================================================

/// A line item in a sale.
/// Uses snapshot pattern to freeze the unit price at time of sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleItem {
    pub id: i64,
    pub sale_id: i64,
    pub product_id: i64,
    pub qty: i64,
    /// Unit price at time of sale (frozen).
    pub price_at_purchase: i64,
    /// qty × price_at_purchase.
    pub subtotal: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Read Models
// =============================================================================

/// One row of the sales list.
///
/// Owner fields are only filled in for admin listings.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleSummary {
    pub uuid: String,
    pub invoice_number: String,
    #[ts(as = "String")]
    pub transaction_date: DateTime<Utc>,
    pub total_price: i64,
    pub status: SaleStatus,
    pub owner_name: Option<String>,
    pub owner_email: Option<String>,
}

/// A line item joined with the product it was derived from.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleItemDetail {
    pub product_id: i64,
    pub product_name: String,
    pub product_description: Option<String>,
    pub qty: i64,
    pub price_at_purchase: i64,
    pub subtotal: i64,
}

/// Contact fields of the owning user, shown on the invoice.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OwnerContact {
    pub name: String,
    pub email: String,
    pub address: Option<String>,
    pub phone: Option<String>,
}

/// A full sale as rendered on the invoice page.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleDetail {
    #[serde(flatten)]
    pub sale: Sale,
    pub owner: Option<OwnerContact>,
    pub items: Vec<SaleItemDetail>,
}

impl SaleDetail {
    /// Σ subtotals; equals `sale.total_price` for every committed sale.
    pub fn items_total(&self) -> i64 {
        self.items.iter().map(|i| i.subtotal).sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_sale() -> Sale {
        let now = Utc::now();
        Sale {
            id: 1,
            uuid: "3b1f0c52-6f3e-4d6c-9d6a-0e7f2d0b9a11".to_string(),
            invoice_number: "INV/0125/0042".to_string(),
            transaction_date: now,
            due_date: now,
            total_price: 100_000,
            status: SaleStatus::Pending,
            user_id: Some(7),
            customer_name: None,
            customer_address: None,
            customer_phone: None,
            description: None,
            created_at: now,
        }
    }

    #[test]
    fn test_sale_status_default() {
        assert_eq!(SaleStatus::default(), SaleStatus::Pending);
        assert_eq!(
            serde_json::to_string(&SaleStatus::Completed).unwrap(),
            "\"completed\""
        );
    }

    #[test]
    fn test_manual_details() {
        let mut sale = sample_sale();
        assert!(sale.manual_details().is_none());

        sale.customer_name = Some("Budi".to_string());
        sale.customer_phone = Some("0812".to_string());
        let details = sale.manual_details().unwrap();
        assert_eq!(details.customer_name, "Budi");
        assert_eq!(details.customer_phone.as_deref(), Some("0812"));
    }

    #[test]
    fn test_internal_key_not_serialized() {
        let json = serde_json::to_value(sample_sale()).unwrap();
        assert!(json.get("id").is_none());
        assert_eq!(json["uuid"], "3b1f0c52-6f3e-4d6c-9d6a-0e7f2d0b9a11");
        assert_eq!(json["total_price"], 100_000);
    }
}
