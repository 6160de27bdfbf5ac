//! Product and variant models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use attara_core::{CategoryId, ProductId, VariantId, VendorId};

/// A product row.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Product {
    pub id: ProductId,
    pub vendor_id: VendorId,
    pub category_id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock: i32,
    pub is_active: bool,
    pub flash_sale_percent: Option<i32>,
    pub flash_sale_ends_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A product variant row. A `NULL` price falls back to the product price.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ProductVariant {
    pub id: VariantId,
    pub product_id: ProductId,
    pub name: String,
    pub price: Option<Decimal>,
    pub stock: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}
