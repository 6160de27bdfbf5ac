//! Address repository.
//!
//! Maintains the one-default-per-user invariant: every write that touches
//! `is_default` runs clear-then-set inside a single transaction, and
//! deleting the default promotes the oldest remaining address.

use sqlx::{PgPool, Postgres, Transaction};

use attara_core::{AddressId, UserId};

use super::RepositoryError;
use crate::models::Address;

const ADDRESS_COLUMNS: &str = "id, user_id, full_name, phone, line1, line2, city, state, \
     country, zip_code, is_default, created_at, updated_at";

/// Field values for creating or updating an address.
#[derive(Debug, Clone)]
pub struct AddressFields {
    pub full_name: String,
    pub phone: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub country: String,
    pub zip_code: String,
    pub is_default: bool,
}

/// Repository for shipping addresses.
pub struct AddressRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AddressRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List a user's addresses, default first, then newest.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Address>, RepositoryError> {
        let addresses = sqlx::query_as::<_, Address>(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM addresses
             WHERE user_id = $1
             ORDER BY is_default DESC, created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;
        Ok(addresses)
    }

    /// Fetch an address by ID regardless of owner.
    ///
    /// Callers distinguish not-found from not-owned themselves so the two
    /// cases surface as different HTTP errors.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: AddressId) -> Result<Option<Address>, RepositoryError> {
        let address = sqlx::query_as::<_, Address>(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM addresses WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(address)
    }

    /// Create an address.
    ///
    /// The user's first address is forced default regardless of the input;
    /// otherwise an explicit default clears the previous one first, in the
    /// same transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn create(
        &self,
        user_id: UserId,
        fields: &AddressFields,
    ) -> Result<Address, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let existing: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM addresses WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&mut *tx)
                .await?;

        let is_default = existing == 0 || fields.is_default;
        if is_default {
            clear_default(&mut tx, user_id).await?;
        }

        let address = sqlx::query_as::<_, Address>(&format!(
            "INSERT INTO addresses
                 (user_id, full_name, phone, line1, line2, city, state, country, zip_code, is_default)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {ADDRESS_COLUMNS}"
        ))
        .bind(user_id)
        .bind(&fields.full_name)
        .bind(&fields.phone)
        .bind(&fields.line1)
        .bind(&fields.line2)
        .bind(&fields.city)
        .bind(&fields.state)
        .bind(&fields.country)
        .bind(&fields.zip_code)
        .bind(is_default)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(address)
    }

    /// Update an address. A `is_default=true` update clears the previous
    /// default transactionally; `is_default=false` on the current default is
    /// ignored (the invariant requires one default while addresses exist).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the row vanished mid-update.
    pub async fn update(
        &self,
        id: AddressId,
        user_id: UserId,
        fields: &AddressFields,
    ) -> Result<Address, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        if fields.is_default {
            clear_default(&mut tx, user_id).await?;
        }

        let address = sqlx::query_as::<_, Address>(&format!(
            "UPDATE addresses SET
                 full_name = $1, phone = $2, line1 = $3, line2 = $4, city = $5,
                 state = $6, country = $7, zip_code = $8,
                 is_default = (is_default OR $9),
                 updated_at = now()
             WHERE id = $10 AND user_id = $11
             RETURNING {ADDRESS_COLUMNS}"
        ))
        .bind(&fields.full_name)
        .bind(&fields.phone)
        .bind(&fields.line1)
        .bind(&fields.line2)
        .bind(&fields.city)
        .bind(&fields.state)
        .bind(&fields.country)
        .bind(&fields.zip_code)
        .bind(fields.is_default)
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        tx.commit().await?;
        Ok(address)
    }

    /// Make an address the user's default (transactional clear-then-set).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address doesn't exist for
    /// this user.
    pub async fn set_default(
        &self,
        id: AddressId,
        user_id: UserId,
    ) -> Result<Address, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        clear_default(&mut tx, user_id).await?;

        let address = sqlx::query_as::<_, Address>(&format!(
            "UPDATE addresses SET is_default = TRUE, updated_at = now()
             WHERE id = $1 AND user_id = $2
             RETURNING {ADDRESS_COLUMNS}"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        tx.commit().await?;
        Ok(address)
    }

    /// Delete an address. When the default is deleted and other addresses
    /// remain, the oldest remaining one (by creation time) is promoted, so
    /// the reassignment is deterministic.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address doesn't exist for
    /// this user.
    pub async fn delete(&self, id: AddressId, user_id: UserId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let was_default: bool = sqlx::query_scalar(
            "DELETE FROM addresses WHERE id = $1 AND user_id = $2 RETURNING is_default",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        if was_default {
            sqlx::query(
                "UPDATE addresses SET is_default = TRUE, updated_at = now()
                 WHERE id = (
                     SELECT id FROM addresses WHERE user_id = $1
                     ORDER BY created_at ASC, id ASC LIMIT 1
                 )",
            )
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

/// Clear the current default inside an open transaction.
async fn clear_default(
    tx: &mut Transaction<'_, Postgres>,
    user_id: UserId,
) -> Result<(), RepositoryError> {
    sqlx::query("UPDATE addresses SET is_default = FALSE WHERE user_id = $1 AND is_default")
        .bind(user_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}
