//! # Sale Service
//!
//! Creates sales atomically and enforces who may read them.
//!
//! ## Create Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Sale Creation                                   │
//! │                                                                         │
//! │  1. access check (manual: admin only)                                   │
//! │  ┌── request timeout ──────────────────────────────────────────────┐    │
//! │  │ 2. shape validation (items, qty, fields)  ─┐ no transaction yet, │    │
//! │  │ 3. catalog lookup, freeze unit prices      │ nothing written     │    │
//! │  │ 4. invoice number + dates                 ─┘                     │    │
//! │  │ 5. BEGIN ─► header ─► items ─► COMMIT                            │    │
//! │  │       └── any error / expiry ─► ROLLBACK                         │    │
//! │  └──────────────────────────────────────────────────────────────────┘    │
//! │  6. return the sale's uuid                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use ts_rs::TS;

use crate::error::{ApiError, ApiResult};
use niaga_core::access::{authorize_read, list_scope, require_admin};
use niaga_core::dates::{parse_date_input, resolve_dates};
use niaga_core::invoice::{InvoiceKind, InvoiceNumberGenerator};
use niaga_core::pricing::{manual_line_spec, price_line, PriceInput, SaleHeader};
use niaga_core::validation::{
    normalize_description, normalize_header_field, validate_customer_name,
    validate_invoice_number, validate_uuid,
};
use niaga_core::{
    CoreError, LineItemSpec, ManualInvoiceDetails, PricedLine, RequestContext, SaleDetail,
    SaleDraft, SaleSummary, ValidationError,
};
use niaga_db::{Database, DbResult, SaleRepository, INVOICE_NUMBER_COLUMN};

// =============================================================================
// Request / Response DTOs
// =============================================================================

/// One line of a customer checkout.
///
/// Only identity and quantity are read. A `price` sent by the client is
/// ignored; the catalog decides.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CheckoutItem {
    pub product_id: i64,
    pub qty: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CheckoutRequest {
    #[serde(default)]
    pub items: Vec<CheckoutItem>,
}

/// One line of a manual invoice. `price` overrides the catalog when present
/// and non-blank.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ManualItem {
    pub product_id: i64,
    pub qty: i64,
    #[serde(default)]
    pub price: Option<PriceInput>,
}

/// Body of `POST /sales/manual`. Header fields are snake_case, as the admin
/// form posts them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ManualInvoiceRequest {
    #[serde(default)]
    pub items: Vec<ManualItem>,
    #[serde(default)]
    pub invoice_number: Option<String>,
    #[serde(default)]
    pub transaction_date: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_address: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Response of both create endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreatedSale {
    pub msg: String,
    #[serde(rename = "saleId")]
    pub sale_id: String,
}

const CHECKOUT_MESSAGE: &str = "Transaksi Berhasil!";
const MANUAL_MESSAGE: &str = "Invoice Manual Berhasil Dibuat!";

/// Action named in the Forbidden message for non-admin manual invoices.
pub const MANUAL_INVOICE_ACTION: &str = "create manual invoices";

// =============================================================================
// Service
// =============================================================================

/// Coordinates sale creation and reads.
#[derive(Debug)]
pub struct SaleService {
    db: Database,
    invoices: InvoiceNumberGenerator,
    due_days: i64,
    write_timeout: Duration,
}

impl SaleService {
    pub fn new(
        db: Database,
        invoices: InvoiceNumberGenerator,
        due_days: i64,
        write_timeout: Duration,
    ) -> Self {
        SaleService {
            db,
            invoices,
            due_days,
            write_timeout,
        }
    }

    // =========================================================================
    // Create
    // =========================================================================

    /// Customer checkout: catalog prices, caller owns the sale.
    pub async fn create_checkout(
        &self,
        ctx: &RequestContext,
        items: Vec<CheckoutItem>,
    ) -> ApiResult<CreatedSale> {
        self.within_deadline(ctx, self.checkout(ctx, items)).await
    }

    /// Admin-entered invoice with optional overrides.
    pub async fn create_manual_invoice(
        &self,
        ctx: &RequestContext,
        req: ManualInvoiceRequest,
    ) -> ApiResult<CreatedSale> {
        require_admin(ctx, MANUAL_INVOICE_ACTION)?;
        self.within_deadline(ctx, self.manual_invoice(ctx, req)).await
    }

    /// Runs one create under the request timeout.
    ///
    /// On expiry the operation is dropped where it stands; an open unit of
    /// work rolls back when dropped.
    async fn within_deadline<T>(
        &self,
        ctx: &RequestContext,
        op: impl Future<Output = ApiResult<T>>,
    ) -> ApiResult<T> {
        let limit = ctx.timeout.unwrap_or(self.write_timeout);
        match tokio::time::timeout(limit, op).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    user_id = ctx.user_id,
                    timeout_ms = limit.as_millis() as u64,
                    "Sale creation timed out, rolled back"
                );
                Err(ApiError::internal("Sale creation timed out"))
            }
        }
    }

    async fn checkout(&self, ctx: &RequestContext, items: Vec<CheckoutItem>) -> ApiResult<CreatedSale> {
        debug!(user_id = ctx.user_id, lines = items.len(), "Checkout requested");

        if items.is_empty() {
            return Err(ValidationError::EmptySale.into());
        }

        let specs = items
            .iter()
            .map(|item| {
                let spec = LineItemSpec::catalog(item.product_id, item.qty);
                spec.validate().map(|_| spec)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let lines = self.price_lines(&specs).await?;

        let now = self.invoices.now();
        let dates = resolve_dates(now, None, None, self.due_days)?;
        let header = SaleHeader {
            invoice_number: self.invoices.generate(InvoiceKind::Checkout, now),
            transaction_date: dates.transaction_date,
            due_date: dates.due_date,
            user_id: Some(ctx.user_id),
            manual: None,
        };

        let draft = SaleDraft::new(header, lines)?;
        let sale_id = self.persist(draft).await?;

        Ok(CreatedSale {
            msg: CHECKOUT_MESSAGE.to_string(),
            sale_id,
        })
    }

    async fn manual_invoice(
        &self,
        ctx: &RequestContext,
        req: ManualInvoiceRequest,
    ) -> ApiResult<CreatedSale> {
        debug!(user_id = ctx.user_id, lines = req.items.len(), "Manual invoice requested");

        if req.items.is_empty() {
            return Err(ValidationError::EmptySale.into());
        }

        let customer_name = validate_customer_name(req.customer_name.as_deref().unwrap_or(""))?;
        let manual = ManualInvoiceDetails {
            customer_name,
            customer_address: normalize_header_field(
                "customer_address",
                req.customer_address.as_deref(),
            )?,
            customer_phone: normalize_header_field("customer_phone", req.customer_phone.as_deref())?,
            description: normalize_description(req.description.as_deref())?,
        };

        let supplied_number = validate_invoice_number(req.invoice_number.as_deref())?;
        let offset = self.invoices.offset();
        let tx_date = parse_date_input("transaction_date", req.transaction_date.as_deref(), offset)?;
        let due_date = parse_date_input("due_date", req.due_date.as_deref(), offset)?;

        let specs = req
            .items
            .iter()
            .map(|item| manual_line_spec(item.product_id, item.qty, item.price.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        let lines = self.price_lines(&specs).await?;

        let dates = resolve_dates(self.invoices.now(), tx_date, due_date, self.due_days)?;
        if dates.is_inverted() {
            warn!(
                transaction_date = %dates.transaction_date,
                due_date = %dates.due_date,
                "Manual invoice due date precedes transaction date"
            );
        }

        let header = SaleHeader {
            invoice_number: self.invoices.manual(supplied_number, dates.transaction_date),
            transaction_date: dates.transaction_date,
            due_date: dates.due_date,
            user_id: Some(ctx.user_id),
            manual: Some(manual),
        };

        let draft = SaleDraft::new(header, lines)?;
        let sale_id = self.persist(draft).await?;

        Ok(CreatedSale {
            msg: MANUAL_MESSAGE.to_string(),
            sale_id,
        })
    }

    /// Freezes a unit price for every line with one catalog query.
    ///
    /// The first unknown product, in request order, is reported.
    async fn price_lines(&self, specs: &[LineItemSpec]) -> ApiResult<Vec<PricedLine>> {
        let mut seen = HashSet::new();
        let ids: Vec<i64> = specs
            .iter()
            .map(LineItemSpec::product_id)
            .filter(|id| seen.insert(*id))
            .collect();

        let catalog = self.db.products().find_many(&ids).await?;

        specs
            .iter()
            .map(|spec| -> ApiResult<PricedLine> {
                let product = catalog
                    .get(&spec.product_id())
                    .ok_or(CoreError::ProductNotFound(spec.product_id()))?;
                Ok(price_line(spec, product.price())?)
            })
            .collect()
    }

    /// Writes the draft in one transaction and returns its uuid.
    async fn persist(&self, draft: SaleDraft) -> ApiResult<String> {
        match write_draft(&self.db.sales(), &draft).await {
            Ok(sale_id) => {
                info!(
                    sale_id,
                    uuid = %draft.uuid,
                    invoice_number = %draft.header.invoice_number,
                    total = %draft.total(),
                    items = draft.lines().len(),
                    user_id = ?draft.header.user_id,
                    "Sale committed"
                );
                Ok(draft.uuid)
            }
            Err(e) if e.is_unique_violation_on(INVOICE_NUMBER_COLUMN) => {
                warn!(invoice_number = %draft.header.invoice_number, "Invoice number already in use");
                Err(ApiError::conflict(format!(
                    "Invoice number '{}' already exists",
                    draft.header.invoice_number
                )))
            }
            Err(e) => Err(e.into()),
        }
    }

    // =========================================================================
    // Read
    // =========================================================================

    /// Admins see every sale; everyone else sees their own.
    pub async fn list_sales(&self, ctx: &RequestContext) -> ApiResult<Vec<SaleSummary>> {
        let sales = self.db.sales().list(list_scope(ctx)).await?;
        debug!(user_id = ctx.user_id, count = sales.len(), "Listed sales");
        Ok(sales)
    }

    /// One sale with its items and the owner's contact fields.
    pub async fn get_sale(&self, ctx: &RequestContext, id: &str) -> ApiResult<SaleDetail> {
        if validate_uuid(id).is_err() {
            return Err(CoreError::SaleNotFound(id.to_string()).into());
        }

        let sale = self
            .db
            .sales()
            .get_by_uuid(id)
            .await?
            .ok_or_else(|| CoreError::SaleNotFound(id.to_string()))?;

        authorize_read(ctx, sale.user_id)?;

        let items = self.db.sales().get_item_details(sale.id).await?;
        let owner = match sale.user_id {
            Some(user_id) => self.db.users().contact(user_id).await?,
            None => None,
        };

        Ok(SaleDetail { sale, owner, items })
    }
}

/// BEGIN, header, items, COMMIT. Rolls back explicitly on a failed write.
async fn write_draft(sales: &SaleRepository, draft: &SaleDraft) -> DbResult<i64> {
    let mut uow = sales.begin().await?;
    match uow.write(draft).await {
        Ok(sale_id) => {
            uow.commit().await?;
            Ok(sale_id)
        }
        Err(e) => {
            if let Err(rb) = uow.rollback().await {
                warn!(error = %rb, "Rollback failed");
            }
            Err(e)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
