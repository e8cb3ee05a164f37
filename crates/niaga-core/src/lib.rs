//! # niaga-core: Pure Business Logic for Niaga Sales
//!
//! This crate is the **heart** of the sale transaction subsystem. It contains
//! every rule that decides what a sale looks like before it is written, as
//! pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Niaga Architecture                               │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Storefront / Admin portal                    │   │
//! │  │        Cart ──► Checkout        Manual invoice form             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP (apps/api)                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ niaga-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  pricing  │  │  invoice  │  │   dates   │  │  access   │  │   │
//! │  │   │ LineItem  │  │ INV/MMYY  │  │  due +7d  │  │ admin or  │  │   │
//! │  │   │ SaleDraft │  │ numbering │  │ overrides │  │  owner    │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    niaga-db (Database Layer)                    │   │
//! │  │        SQLite queries, migrations, sale unit of work            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Sale, SaleItem, read models)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`context`] - Caller identity (`RequestContext`, `Role`)
//! - [`pricing`] - Line item specs, price resolution, `SaleDraft`
//! - [`invoice`] - Invoice number generation
//! - [`dates`] - Transaction/due date resolution
//! - [`access`] - Read/write authorization rules
//! - [`validation`] - Input validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use niaga_core::money::Money;
//! use niaga_core::pricing::{price_line, LineItemSpec};
//!
//! // Catalog price 50.000, quantity 2
//! let spec = LineItemSpec::catalog(1, 2);
//! let line = price_line(&spec, Money::from_minor(50_000)).unwrap();
//!
//! assert_eq!(line.price_at_purchase, 50_000);
//! assert_eq!(line.subtotal, 100_000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod access;
pub mod context;
pub mod dates;
pub mod error;
pub mod invoice;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use context::{RequestContext, Role};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use pricing::{LineItemSpec, PricedLine, SaleDraft};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Days between the transaction date and the default payment deadline.
pub const DEFAULT_DUE_DAYS: i64 = 7;

/// Longest invoice number an admin may supply.
pub const MAX_INVOICE_NUMBER_LEN: usize = 100;

/// Longest free-text header field (customer name, address, phone).
pub const MAX_HEADER_FIELD_LEN: usize = 255;

/// Longest manual invoice description.
pub const MAX_DESCRIPTION_LEN: usize = 2000;
