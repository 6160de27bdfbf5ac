//! Cart models and the priced cart view.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use attara_core::{CartId, CartItemId, ProductId, UserId, VariantId, VendorId};

/// A cart row (1:1 with a user, lazily created).
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Cart {
    pub id: CartId,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A cart item joined against the live product/variant rows.
///
/// Carries everything pricing needs: the raw prices, the flash-sale window,
/// and the vendor for the eventual order-item snapshot.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PricedCartItem {
    pub id: CartItemId,
    pub product_id: ProductId,
    pub variant_id: Option<VariantId>,
    pub vendor_id: VendorId,
    pub product_name: String,
    pub variant_name: Option<String>,
    pub quantity: i32,
    pub product_price: Decimal,
    pub variant_price: Option<Decimal>,
    pub flash_sale_percent: Option<i32>,
    pub flash_sale_ends_at: Option<DateTime<Utc>>,
}

/// One priced line in the cart response.
#[derive(Debug, Clone, Serialize)]
pub struct CartLineView {
    pub id: CartItemId,
    pub product_id: ProductId,
    pub variant_id: Option<VariantId>,
    pub product_name: String,
    pub variant_name: Option<String>,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

/// The full cart response: lines plus totals computed on this read.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub id: CartId,
    pub items: Vec<CartLineView>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping_fee: Decimal,
    pub total: Decimal,
    pub coins_earnable: i32,
}
