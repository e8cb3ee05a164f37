//! # Product Repository
//!
//! Read access to the catalog, plus the inserts the seed binary and tests
//! need. Catalog CRUD itself belongs to another service.

use std::collections::HashMap;

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use niaga_core::Product;

const PRODUCT_COLUMNS: &str = "id, uuid, name, description, price, created_at, updated_at";

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by its integer key.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Looks up several products in one round trip.
    ///
    /// Missing ids are simply absent from the map; the caller decides which
    /// one to report.
    pub async fn find_many(&self, ids: &[i64]) -> DbResult<HashMap<i64, Product>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id IN ("));
        let mut separated = qb.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        let products: Vec<Product> = qb.build_query_as().fetch_all(&self.pool).await?;
        debug!(requested = ids.len(), found = products.len(), "Catalog lookup");

        Ok(products.into_iter().map(|p| (p.id, p)).collect())
    }

    /// Lists the catalog ordered by name.
    pub async fn list(&self, limit: i64) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY name LIMIT ?1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Inserts a product.
    pub async fn insert(&self, name: &str, description: Option<&str>, price: i64) -> DbResult<Product> {
        let uuid = Uuid::new_v4().to_string();
        let now = Utc::now();

        debug!(uuid = %uuid, name = %name, price, "Inserting product");

        let result = sqlx::query(
            r#"
            INSERT INTO products (uuid, name, description, price, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            "#,
        )
        .bind(&uuid)
        .bind(name)
        .bind(description)
        .bind(price)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id.to_string()))
    }

    /// Number of catalog products.
    pub async fn count(&self) -> DbResult<i64> {
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }

    /// Changes a product's catalog price. Committed sales keep their frozen price.
    pub async fn update_price(&self, id: i64, price: i64) -> DbResult<()> {
        let result = sqlx::query("UPDATE products SET price = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(price)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id.to_string()));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
