//! # Sale Repository
//!
//! Database operations for sales and sale items.
//!
//! ## Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Unit of Work                                 │
//! │                                                                         │
//! │  let mut uow = db.sales().begin().await?;      BEGIN                    │
//! │  let id = uow.insert_header(&draft).await?;    INSERT INTO sales        │
//! │  uow.insert_items(id, draft.lines()).await?;   INSERT INTO sale_items   │
//! │  uow.commit().await?;                          COMMIT                   │
//! │                                                                         │
//! │  Any error ──► uow.rollback()                  ROLLBACK                 │
//! │  uow dropped (timeout, cancelled) ──────────►  ROLLBACK                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Header and items are either both visible to other connections or neither
//! is. An invoice number collision surfaces from `insert_header` as
//! [`DbError::UniqueViolation`] carrying the number.

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool, Transaction};
use tracing::debug;

use crate::error::{DbError, DbResult};
use niaga_core::access::ListScope;
use niaga_core::{PricedLine, Sale, SaleDraft, SaleItem, SaleItemDetail, SaleSummary};

const SALE_COLUMNS: &str = r#"
    id, uuid, invoice_number, transaction_date, due_date, total_price, status,
    user_id, customer_name, customer_address, customer_phone, description, created_at
"#;

/// Column that carries the invoice number's UNIQUE constraint.
pub const INVOICE_NUMBER_COLUMN: &str = "sales.invoice_number";

// =============================================================================
// Unit of Work
// =============================================================================

/// One open write transaction for a single sale.
///
/// Dropping it without [`commit`](Self::commit) rolls back.
#[derive(Debug)]
pub struct SaleUnitOfWork {
    tx: Transaction<'static, Sqlite>,
}

impl SaleUnitOfWork {
    /// Inserts the header and returns its internal key.
    pub async fn insert_header(&mut self, draft: &SaleDraft) -> DbResult<i64> {
        let header = &draft.header;
        let manual = header.manual.as_ref();

        debug!(
            uuid = %draft.uuid,
            invoice_number = %header.invoice_number,
            total = draft.total().amount(),
            "Inserting sale header"
        );

        let result = sqlx::query(
            r#"
            INSERT INTO sales (
                uuid, invoice_number, transaction_date, due_date,
                total_price, status, user_id,
                customer_name, customer_address, customer_phone, description,
                created_at
            ) VALUES (
                ?1, ?2, ?3, ?4,
                ?5, ?6, ?7,
                ?8, ?9, ?10, ?11,
                ?12
            )
            "#,
        )
        .bind(&draft.uuid)
        .bind(&header.invoice_number)
        .bind(header.transaction_date)
        .bind(header.due_date)
        .bind(draft.total().amount())
        .bind(draft.status)
        .bind(header.user_id)
        .bind(manual.map(|m| m.customer_name.as_str()))
        .bind(manual.and_then(|m| m.customer_address.as_deref()))
        .bind(manual.and_then(|m| m.customer_phone.as_deref()))
        .bind(manual.and_then(|m| m.description.as_deref()))
        .bind(Utc::now())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } if field == INVOICE_NUMBER_COLUMN => {
                DbError::duplicate(field, header.invoice_number.clone())
            }
            other => other,
        })?;

        Ok(result.last_insert_rowid())
    }

    /// Inserts every line of the sale in one statement.
    pub async fn insert_items(&mut self, sale_id: i64, lines: &[PricedLine]) -> DbResult<()> {
        if lines.is_empty() {
            return Ok(());
        }

        debug!(sale_id, count = lines.len(), "Inserting sale items");

        let now = Utc::now();
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            "INSERT INTO sale_items (sale_id, product_id, qty, price_at_purchase, subtotal, created_at) ",
        );
        qb.push_values(lines, |mut row, line| {
            row.push_bind(sale_id)
                .push_bind(line.product_id)
                .push_bind(line.qty)
                .push_bind(line.price_at_purchase)
                .push_bind(line.subtotal)
                .push_bind(now);
        });

        qb.build().execute(&mut *self.tx).await?;
        Ok(())
    }

    /// Header then items. Returns the header's internal key.
    pub async fn write(&mut self, draft: &SaleDraft) -> DbResult<i64> {
        let sale_id = self.insert_header(draft).await?;
        self.insert_items(sale_id, draft.lines()).await?;
        Ok(sale_id)
    }

    pub async fn commit(self) -> DbResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))
    }

    pub async fn rollback(self) -> DbResult<()> {
        self.tx
            .rollback()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Opens a write transaction.
    pub async fn begin(&self) -> DbResult<SaleUnitOfWork> {
        let tx = self.pool.begin().await.map_err(|e| match e {
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            other => DbError::TransactionFailed(other.to_string()),
        })?;
        Ok(SaleUnitOfWork { tx })
    }

    /// Lists sales newest first, limited to what `scope` allows.
    ///
    /// Owner display fields are only joined for [`ListScope::All`].
    pub async fn list(&self, scope: ListScope) -> DbResult<Vec<SaleSummary>> {
        let sales = match scope {
            ListScope::All => {
                sqlx::query_as::<_, SaleSummary>(
                    r#"
                    SELECT s.uuid, s.invoice_number, s.transaction_date, s.total_price, s.status,
                           u.name AS owner_name, u.email AS owner_email
                    FROM sales s
                    LEFT JOIN users u ON u.id = s.user_id
                    ORDER BY s.transaction_date DESC, s.id DESC
                    "#,
                )
                .fetch_all(&self.pool)
                .await?
            }
            ListScope::OwnedBy(user_id) => {
                sqlx::query_as::<_, SaleSummary>(
                    r#"
                    SELECT uuid, invoice_number, transaction_date, total_price, status,
                           NULL AS owner_name, NULL AS owner_email
                    FROM sales
                    WHERE user_id = ?1
                    ORDER BY transaction_date DESC, id DESC
                    "#,
                )
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?
            }
        };

        debug!(?scope, count = sales.len(), "Listed sales");
        Ok(sales)
    }

    /// Gets a sale header by its external identifier.
    pub async fn get_by_uuid(&self, uuid: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE uuid = ?1"
        ))
        .bind(uuid)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Gets a sale header by its invoice number.
    pub async fn get_by_invoice_number(&self, invoice_number: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE invoice_number = ?1"
        ))
        .bind(invoice_number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Raw line items of a sale.
    pub async fn get_items(&self, sale_id: i64) -> DbResult<Vec<SaleItem>> {
        let items = sqlx::query_as::<_, SaleItem>(
            r#"
            SELECT id, sale_id, product_id, qty, price_at_purchase, subtotal, created_at
            FROM sale_items
            WHERE sale_id = ?1
            ORDER BY id
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Line items joined with the product's display fields.
    ///
    /// Prices come from the item row, never from the product.
    pub async fn get_item_details(&self, sale_id: i64) -> DbResult<Vec<SaleItemDetail>> {
        let items = sqlx::query_as::<_, SaleItemDetail>(
            r#"
            SELECT si.product_id,
                   p.name AS product_name,
                   p.description AS product_description,
                   si.qty, si.price_at_purchase, si.subtotal
            FROM sale_items si
            JOIN products p ON p.id = si.product_id
            WHERE si.sale_id = ?1
            ORDER BY si.id
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Number of sale headers.
    pub async fn count(&self) -> DbResult<i64> {
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }

    /// Number of sale item rows.
    pub async fn count_items(&self) -> DbResult<i64> {
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sale_items")
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
