//! HTTP handlers.
//!
//! Handlers extract, call a service, and wrap the result. Status codes for
//! failures come from [`ApiError`](crate::error::ApiError).

pub mod products;
pub mod sales;

use axum::extract::State;
use axum::http::StatusCode;

use crate::AppState;

/// Liveness plus a `SELECT 1` against the pool.
pub async fn health(State(state): State<AppState>) -> (StatusCode, &'static str) {
    if state.db.health_check().await {
        (StatusCode::OK, "OK")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "DATABASE UNAVAILABLE")
    }
}
