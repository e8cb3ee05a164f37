//! # Niaga API
//!
//! HTTP server for creating and reading sales.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Niaga API                                      │
//! │                                                                         │
//! │  POST /checkout ─────┐                                                  │
//! │  POST /sales/manual ─┤   Authenticated    ┌──────────────┐              │
//! │  GET  /sales ────────┼──► (JWT → ctx) ───►│ SaleService  │──► niaga-db │
//! │  GET  /sales/{id} ───┘                    └──────────────┘              │
//! │                                                                         │
//! │  GET  /products, GET /health ──────────────────────────────► niaga-db  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! See [`config`]. Environment variables:
//! - `NIAGA_BIND_ADDR`, `NIAGA_PORT` - listener (default 0.0.0.0:8080)
//! - `NIAGA_DB_PATH` - SQLite file
//! - `NIAGA_JWT_SECRET`, `NIAGA_TOKEN_LIFETIME_SECS` - token signing
//! - `NIAGA_DUE_DAYS` - default payment term (7)
//! - `NIAGA_WRITE_TIMEOUT_MS` - bound on one sale write (5000)
//! - `NIAGA_UTC_OFFSET_MINUTES` - business timezone (480, i.e. +08:00)

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tracing_subscriber::EnvFilter;

use niaga_core::invoice::{Clock, InvoiceNumberGenerator, SystemClock};
use niaga_db::Database;

// Re-exports
pub use auth::{Authenticated, JwtManager};
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult, ErrorCode};
pub use services::SaleService;

/// Shared application state. Cheap to clone.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub sales: Arc<SaleService>,
    pub jwt: Arc<JwtManager>,
    pub config: Arc<ApiConfig>,
}

impl AppState {
    pub fn new(db: Database, config: ApiConfig) -> Self {
        Self::with_clock(db, config, Arc::new(SystemClock))
    }

    /// State whose invoice numbers and default dates come from `clock`.
    pub fn with_clock(db: Database, config: ApiConfig, clock: Arc<dyn Clock>) -> Self {
        let invoices = InvoiceNumberGenerator::new(clock, config.offset());
        let sales = SaleService::new(
            db.clone(),
            invoices,
            config.sales.due_days,
            config.write_timeout(),
        );
        let jwt = JwtManager::new(config.auth.jwt_secret.clone(), config.auth.token_lifetime_secs);

        AppState {
            db,
            sales: Arc::new(sales),
            jwt: Arc::new(jwt),
            config: Arc::new(config),
        }
    }
}

/// Builds the HTTP router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/checkout", post(routes::sales::checkout))
        .route("/sales", get(routes::sales::list))
        .route("/sales/manual", post(routes::sales::create_manual))
        .route("/sales/{id}", get(routes::sales::get_one))
        .route("/products", get(routes::products::list))
        .route("/health", get(routes::health))
        .with_state(state)
}

/// Installs the global tracing subscriber. `RUST_LOG` overrides the default.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,niaga=debug,sqlx=warn")),
        )
        .with_target(true)
        .init();
}
