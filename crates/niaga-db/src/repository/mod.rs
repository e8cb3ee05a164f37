//! # Repository Module
//!
//! Database repository implementations for Niaga.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  SaleService (apps/api)                                                │
//! │       │                                                                 │
//! │       │  db.products().find_many(&ids)     catalog lookup              │
//! │       │  db.sales().begin()                unit of work                │
//! │       │  db.sales().list(scope)            access-filtered reads       │
//! │       ▼                                                                 │
//! │  ProductRepository / UserRepository / SaleRepository                   │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Catalog lookup
//! - [`UserRepository`](user::UserRepository) - Owner display fields
//! - [`SaleRepository`](sale::SaleRepository) - Sale writes and reads

pub mod product;
pub mod sale;
pub mod user;
