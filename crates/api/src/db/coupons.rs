//! Coupon repository.
//!
//! Vendor-created coupons only; user-restricted redemption coupons are
//! minted by the wallet repository. Usage claiming happens in checkout,
//! not here.

use rust_decimal::Decimal;
use sqlx::PgPool;

use attara_core::{CouponId, DiscountKind, VendorId};
use chrono::{DateTime, Utc};

use super::RepositoryError;
use crate::models::Coupon;

const COUPON_COLUMNS: &str = "id, code, vendor_id, user_id, kind, value, min_order_amount, \
     usage_limit, used_count, expires_at, is_active, created_at";

/// Field values for creating a vendor coupon.
#[derive(Debug, Clone)]
pub struct CouponFields {
    pub code: String,
    pub kind: DiscountKind,
    pub value: Decimal,
    pub min_order_amount: Decimal,
    pub usage_limit: i32,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Partial update of a coupon's redemption constraints.
#[derive(Debug, Clone, Default)]
pub struct CouponChanges {
    pub usage_limit: Option<i32>,
    pub min_order_amount: Option<Decimal>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
}

/// Repository for coupons.
pub struct CouponRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CouponRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a vendor coupon. Codes are stored uppercase.
    ///
    /// # Errors
    ///
    /// - `Invalid` for a non-positive value, percentage over 100, or
    ///   usage limit below 1.
    /// - `Conflict` if the code is taken.
    pub async fn create(
        &self,
        vendor_id: VendorId,
        fields: &CouponFields,
    ) -> Result<Coupon, RepositoryError> {
        if fields.value <= Decimal::ZERO {
            return Err(RepositoryError::Invalid(
                "coupon value must be positive".to_owned(),
            ));
        }
        if fields.kind == DiscountKind::Percent && fields.value > Decimal::ONE_HUNDRED {
            return Err(RepositoryError::Invalid(
                "percentage discount cannot exceed 100".to_owned(),
            ));
        }
        if fields.usage_limit < 1 {
            return Err(RepositoryError::Invalid(
                "usage limit must be at least 1".to_owned(),
            ));
        }

        let coupon = sqlx::query_as::<_, Coupon>(&format!(
            "INSERT INTO coupons
                 (code, vendor_id, kind, value, min_order_amount, usage_limit, expires_at)
             VALUES (upper($1), $2, $3, $4, $5, $6, $7)
             RETURNING {COUPON_COLUMNS}"
        ))
        .bind(&fields.code)
        .bind(vendor_id)
        .bind(fields.kind)
        .bind(fields.value)
        .bind(fields.min_order_amount)
        .bind(fields.usage_limit)
        .bind(fields.expires_at)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "coupon code already exists"))?;

        Ok(coupon)
    }

    /// Look up a coupon by its code, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_code(&self, code: &str) -> Result<Option<Coupon>, RepositoryError> {
        let coupon = sqlx::query_as::<_, Coupon>(&format!(
            "SELECT {COUPON_COLUMNS} FROM coupons WHERE code = upper($1)"
        ))
        .bind(code)
        .fetch_optional(self.pool)
        .await?;
        Ok(coupon)
    }

    /// A vendor's coupons, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_vendor(
        &self,
        vendor_id: VendorId,
    ) -> Result<Vec<Coupon>, RepositoryError> {
        let coupons = sqlx::query_as::<_, Coupon>(&format!(
            "SELECT {COUPON_COLUMNS} FROM coupons
             WHERE vendor_id = $1
             ORDER BY created_at DESC"
        ))
        .bind(vendor_id)
        .fetch_all(self.pool)
        .await?;
        Ok(coupons)
    }

    /// Edit a vendor coupon's limits. The code, kind and value are fixed at
    /// creation; only the redemption constraints and active flag move.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the coupon doesn't belong to this vendor.
    /// - `Invalid` if the new usage limit is below the claimed count.
    pub async fn update_limits(
        &self,
        id: CouponId,
        vendor_id: VendorId,
        changes: &CouponChanges,
    ) -> Result<Coupon, RepositoryError> {
        if let Some(limit) = changes.usage_limit
            && limit < 1
        {
            return Err(RepositoryError::Invalid(
                "usage limit must be at least 1".to_owned(),
            ));
        }

        let updated = sqlx::query_as::<_, Coupon>(&format!(
            "UPDATE coupons SET
                 usage_limit = COALESCE($3, usage_limit),
                 min_order_amount = COALESCE($4, min_order_amount),
                 expires_at = COALESCE($5, expires_at),
                 is_active = COALESCE($6, is_active)
             WHERE id = $1 AND vendor_id = $2
             RETURNING {COUPON_COLUMNS}"
        ))
        .bind(id)
        .bind(vendor_id)
        .bind(changes.usage_limit)
        .bind(changes.min_order_amount)
        .bind(changes.expires_at)
        .bind(changes.is_active)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| {
            RepositoryError::from_check(e, "usage limit cannot drop below the claimed count")
        })?;

        updated.ok_or(RepositoryError::NotFound)
    }

    /// Deactivate a vendor's coupon. Already-claimed usages stand; the
    /// coupon simply stops validating.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the coupon doesn't belong to
    /// this vendor.
    pub async fn deactivate(
        &self,
        id: CouponId,
        vendor_id: VendorId,
    ) -> Result<Coupon, RepositoryError> {
        sqlx::query_as::<_, Coupon>(&format!(
            "UPDATE coupons SET is_active = FALSE
             WHERE id = $1 AND vendor_id = $2
             RETURNING {COUPON_COLUMNS}"
        ))
        .bind(id)
        .bind(vendor_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }
}
