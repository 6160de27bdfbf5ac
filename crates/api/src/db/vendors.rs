//! Vendor repository.
//!
//! Moderation goes through `set_status`, which locks the vendor row,
//! validates the target against the persisted status, and applies the
//! side effects (user role flip, product activation fan-out) in the same
//! transaction.

use sqlx::{PgPool, Postgres, QueryBuilder};

use attara_core::{PageParams, Paginated, UserId, UserRole, VendorId, VendorStatus};

use super::RepositoryError;
use super::users::set_role;
use crate::models::Vendor;

const VENDOR_COLUMNS: &str = "id, user_id, store_name, description, status, created_at, updated_at";

/// Repository for vendor profiles.
pub struct VendorRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> VendorRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Apply to become a vendor. The profile starts `pending`; the user's
    /// role flips only on approval.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the user already has a vendor
    /// profile.
    pub async fn apply(
        &self,
        user_id: UserId,
        store_name: &str,
        description: Option<&str>,
    ) -> Result<Vendor, RepositoryError> {
        if store_name.trim().is_empty() {
            return Err(RepositoryError::Invalid(
                "store name must not be empty".to_owned(),
            ));
        }

        let vendor = sqlx::query_as::<_, Vendor>(&format!(
            "INSERT INTO vendors (user_id, store_name, description)
             VALUES ($1, $2, $3)
             RETURNING {VENDOR_COLUMNS}"
        ))
        .bind(user_id)
        .bind(store_name.trim())
        .bind(description)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "user already has a vendor profile"))?;

        Ok(vendor)
    }

    /// Fetch a vendor by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: VendorId) -> Result<Option<Vendor>, RepositoryError> {
        let vendor = sqlx::query_as::<_, Vendor>(&format!(
            "SELECT {VENDOR_COLUMNS} FROM vendors WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(vendor)
    }

    /// Fetch the vendor profile belonging to a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_user(&self, user_id: UserId) -> Result<Option<Vendor>, RepositoryError> {
        let vendor = sqlx::query_as::<_, Vendor>(&format!(
            "SELECT {VENDOR_COLUMNS} FROM vendors WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;
        Ok(vendor)
    }

    /// Paginated admin listing, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        status: Option<VendorStatus>,
        page: PageParams,
    ) -> Result<Paginated<Vendor>, RepositoryError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM vendors WHERE TRUE");
        let mut query = QueryBuilder::<Postgres>::new(format!(
            "SELECT {VENDOR_COLUMNS} FROM vendors WHERE TRUE"
        ));

        for qb in [&mut count, &mut query] {
            if let Some(status) = status {
                qb.push(" AND status = ").push_bind(status);
            }
        }

        let total: i64 = count.build_query_scalar().fetch_one(self.pool).await?;

        query.push(" ORDER BY created_at DESC LIMIT ");
        query.push_bind(page.limit());
        query.push(" OFFSET ");
        query.push_bind(page.offset());

        let vendors = query
            .build_query_as::<Vendor>()
            .fetch_all(self.pool)
            .await?;

        Ok(Paginated::new(vendors, total, page))
    }

    /// Apply a guarded moderation transition.
    ///
    /// Approval flips the owning user's role to `vendor` and reactivates
    /// the vendor's products; suspension and rejection deactivate them.
    /// All writes share one transaction.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the vendor doesn't exist.
    /// - `IllegalTransition` if the guard rejects the jump.
    pub async fn set_status(
        &self,
        id: VendorId,
        next: VendorStatus,
    ) -> Result<Vendor, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Vendor>(&format!(
            "SELECT {VENDOR_COLUMNS} FROM vendors WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        if !current.status.can_transition_to(next) {
            return Err(RepositoryError::IllegalTransition(format!(
                "cannot move vendor from {} to {next}",
                current.status
            )));
        }

        let vendor = sqlx::query_as::<_, Vendor>(&format!(
            "UPDATE vendors SET status = $1, updated_at = now()
             WHERE id = $2
             RETURNING {VENDOR_COLUMNS}"
        ))
        .bind(next)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        match next {
            VendorStatus::Approved => {
                set_role(&mut tx, vendor.user_id, UserRole::Vendor).await?;
                sqlx::query("UPDATE products SET is_active = TRUE, updated_at = now() WHERE vendor_id = $1")
                    .bind(id)
                    .execute(&mut *tx)
                    .await?;
            }
            VendorStatus::Suspended | VendorStatus::Rejected => {
                sqlx::query(
                    "UPDATE products SET is_active = FALSE, updated_at = now() WHERE vendor_id = $1",
                )
                .bind(id)
                .execute(&mut *tx)
                .await?;
            }
            VendorStatus::Pending => {}
        }

        tx.commit().await?;
        Ok(vendor)
    }
}
