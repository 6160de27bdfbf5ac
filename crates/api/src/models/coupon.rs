//! Coupon model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use attara_core::{CouponId, DiscountKind, UserId, VendorId};

/// A coupon row.
///
/// Vendor-created coupons have `vendor_id` set; coupons minted from coin
/// redemption have `user_id` set instead and may only be used by that user.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Coupon {
    pub id: CouponId,
    pub code: String,
    pub vendor_id: Option<VendorId>,
    pub user_id: Option<UserId>,
    pub kind: DiscountKind,
    pub value: Decimal,
    pub min_order_amount: Decimal,
    pub usage_limit: i32,
    pub used_count: i32,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}
