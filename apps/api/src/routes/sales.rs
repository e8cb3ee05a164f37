//! Sale routes.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::auth::Authenticated;
use crate::error::ApiResult;
use crate::services::sale_service::{
    CheckoutRequest, CreatedSale, ManualInvoiceRequest, MANUAL_INVOICE_ACTION,
};
use crate::AppState;
use niaga_core::access::require_admin;
use niaga_core::{SaleDetail, SaleSummary};

/// `POST /checkout`
pub async fn checkout(
    State(state): State<AppState>,
    Authenticated(ctx): Authenticated,
    body: Result<Json<CheckoutRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CreatedSale>)> {
    let Json(req) = body?;
    let created = state.sales.create_checkout(&ctx, req.items).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `POST /sales/manual` (admin)
///
/// Non-admins are refused before the body is looked at.
pub async fn create_manual(
    State(state): State<AppState>,
    Authenticated(ctx): Authenticated,
    body: Result<Json<ManualInvoiceRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CreatedSale>)> {
    require_admin(&ctx, MANUAL_INVOICE_ACTION)?;
    let Json(req) = body?;
    let created = state.sales.create_manual_invoice(&ctx, req).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /sales`
pub async fn list(
    State(state): State<AppState>,
    Authenticated(ctx): Authenticated,
) -> ApiResult<Json<Vec<SaleSummary>>> {
    Ok(Json(state.sales.list_sales(&ctx).await?))
}

/// `GET /sales/{id}`
pub async fn get_one(
    State(state): State<AppState>,
    Authenticated(ctx): Authenticated,
    Path(id): Path<String>,
) -> ApiResult<Json<SaleDetail>> {
    Ok(Json(state.sales.get_sale(&ctx, &id).await?))
}
