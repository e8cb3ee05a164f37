//! Service layer.
//!
//! Services hold the orchestration between request DTOs, the pure rules in
//! `niaga-core` and the repositories in `niaga-db`. Handlers stay thin.

pub mod sale_service;

pub use sale_service::SaleService;
