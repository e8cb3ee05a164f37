//! # User Repository
//!
//! Display and contact fields of account holders. Used for the owner
//! columns of sale reads and by the seed binary.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use niaga_core::{OwnerContact, Role, User};

/// Repository for user rows.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Inserts a user and returns the stored row.
    pub async fn insert(
        &self,
        name: &str,
        email: &str,
        role: Role,
        address: Option<&str>,
        phone: Option<&str>,
    ) -> DbResult<User> {
        debug!(email = %email, role = %role, "Inserting user");

        let result = sqlx::query(
            r#"
            INSERT INTO users (name, email, role, address, phone, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(role)
        .bind(address)
        .bind(phone)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::duplicate(field, email),
            other => other,
        })?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("User", id.to_string()))
    }

    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, role, address, phone FROM users WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, role, address, phone FROM users WHERE email = ?1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Contact fields shown on an invoice.
    pub async fn contact(&self, id: i64) -> DbResult<Option<OwnerContact>> {
        let contact = sqlx::query_as::<_, OwnerContact>(
            "SELECT name, email, address, phone FROM users WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(contact)
    }

    /// Deletes a user. Their sales stay, with `user_id` set to NULL.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id.to_string()));
        }

        debug!(id, "Deleted user");
        Ok(())
    }

    pub async fn count(&self) -> DbResult<i64> {
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
