//! # niaga-db: Database Layer for Niaga
//!
//! This crate provides database access for the Niaga sale subsystem.
//! It uses SQLite with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Niaga Data Flow                                  │
//! │                                                                         │
//! │  SaleService (apps/api)                                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     niaga-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ ProductRepo   │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ UserRepo      │    │ 001_init.sql │  │   │
//! │  │   │               │    │ SaleRepo      │    │              │  │   │
//! │  │   │               │    │ SaleUnitOfWork│    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database (niaga.db)                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (product, user, sale)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use niaga_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("niaga.db")).await?;
//!
//! let mut uow = db.sales().begin().await?;
//! uow.write(&draft).await?;
//! uow.commit().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::product::ProductRepository;
pub use repository::sale::{SaleRepository, SaleUnitOfWork, INVOICE_NUMBER_COLUMN};
pub use repository::user::UserRepository;
