//! Vendor self-service routes.
//!
//! Everything except `apply` and `profile` requires an approved vendor
//! profile via the `RequireVendor` extractor; ownership of products and
//! coupons is enforced in the repository queries themselves.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use attara_core::{
    CategoryId, CouponId, DiscountKind, OrderId, PageParams, Paginated, ProductId, VariantId,
};

use crate::db::coupons::{CouponChanges, CouponFields};
use crate::db::products::{ProductFields, VariantFields};
use crate::db::{CouponRepository, OrderRepository, ProductRepository, VendorRepository};
use crate::error::AppError;
use crate::middleware::{CurrentUser, RequireVendor};
use crate::models::order::Order;
use crate::models::product::{Product, ProductVariant};
use crate::models::{Coupon, Vendor};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ApplyRequest {
    pub store_name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProductRequest {
    pub category_id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock: i32,
}

#[derive(Debug, Deserialize)]
pub struct VariantRequest {
    pub name: String,
    pub price: Option<Decimal>,
    pub stock: i32,
}

#[derive(Debug, Deserialize)]
pub struct FlashSaleRequest {
    pub percent: i32,
    pub ends_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CouponRequest {
    pub code: String,
    pub kind: DiscountKind,
    pub value: Decimal,
    #[serde(default)]
    pub min_order_amount: Decimal,
    pub usage_limit: i32,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Default)]
pub struct CouponPatch {
    pub usage_limit: Option<i32>,
    pub min_order_amount: Option<Decimal>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct AdvanceRequest {
    pub tracking_number: Option<String>,
}

/// `POST /vendor/apply` - apply for a vendor profile (starts `pending`).
pub async fn apply(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(body): Json<ApplyRequest>,
) -> Result<(StatusCode, Json<Vendor>), AppError> {
    let vendor = VendorRepository::new(state.pool())
        .apply(current.id, &body.store_name, body.description.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(vendor)))
}

/// `GET /vendor/profile` - own vendor record, whatever its status.
pub async fn profile(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<Vendor>, AppError> {
    VendorRepository::new(state.pool())
        .get_by_user(current.id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound)
}

/// `GET /vendor/products` - own products, active or not.
pub async fn list_products(
    State(state): State<AppState>,
    vendor: RequireVendor,
    Query(page): Query<PageParams>,
) -> Result<Json<Paginated<Product>>, AppError> {
    let products = ProductRepository::new(state.pool())
        .list_for_vendor(vendor.vendor_id, page)
        .await?;
    Ok(Json(products))
}

/// `POST /vendor/products` - create a product.
pub async fn create_product(
    State(state): State<AppState>,
    vendor: RequireVendor,
    Json(body): Json<ProductRequest>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    let fields = ProductFields {
        category_id: body.category_id,
        name: body.name,
        description: body.description,
        price: body.price,
        stock: body.stock,
    };
    let product = ProductRepository::new(state.pool())
        .create(vendor.vendor_id, &fields)
        .await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// `PATCH /vendor/products/{id}` - update an own product.
pub async fn update_product(
    State(state): State<AppState>,
    vendor: RequireVendor,
    Path(id): Path<ProductId>,
    Json(body): Json<ProductRequest>,
) -> Result<Json<Product>, AppError> {
    let fields = ProductFields {
        category_id: body.category_id,
        name: body.name,
        description: body.description,
        price: body.price,
        stock: body.stock,
    };
    let product = ProductRepository::new(state.pool())
        .update(id, vendor.vendor_id, &fields)
        .await?;
    Ok(Json(product))
}

/// `DELETE /vendor/products/{id}` - soft-delete an own product.
pub async fn delete_product(
    State(state): State<AppState>,
    vendor: RequireVendor,
    Path(id): Path<ProductId>,
) -> Result<StatusCode, AppError> {
    ProductRepository::new(state.pool())
        .soft_delete(id, vendor.vendor_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /vendor/products/{id}/variants` - add a variant.
pub async fn add_variant(
    State(state): State<AppState>,
    vendor: RequireVendor,
    Path(id): Path<ProductId>,
    Json(body): Json<VariantRequest>,
) -> Result<(StatusCode, Json<ProductVariant>), AppError> {
    let fields = VariantFields {
        name: body.name,
        price: body.price,
        stock: body.stock,
    };
    let variant = ProductRepository::new(state.pool())
        .add_variant(id, vendor.vendor_id, &fields)
        .await?;
    Ok((StatusCode::CREATED, Json(variant)))
}

/// `DELETE /vendor/variants/{id}` - deactivate a variant.
pub async fn remove_variant(
    State(state): State<AppState>,
    vendor: RequireVendor,
    Path(id): Path<VariantId>,
) -> Result<StatusCode, AppError> {
    ProductRepository::new(state.pool())
        .remove_variant(id, vendor.vendor_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /vendor/products/{id}/flash-sale` - start a flash sale.
pub async fn set_flash_sale(
    State(state): State<AppState>,
    vendor: RequireVendor,
    Path(id): Path<ProductId>,
    Json(body): Json<FlashSaleRequest>,
) -> Result<Json<Product>, AppError> {
    let product = ProductRepository::new(state.pool())
        .set_flash_sale(id, vendor.vendor_id, body.percent, body.ends_at)
        .await?;
    Ok(Json(product))
}

/// `DELETE /vendor/products/{id}/flash-sale` - end a flash sale.
pub async fn clear_flash_sale(
    State(state): State<AppState>,
    vendor: RequireVendor,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>, AppError> {
    let product = ProductRepository::new(state.pool())
        .clear_flash_sale(id, vendor.vendor_id)
        .await?;
    Ok(Json(product))
}

/// `GET /vendor/coupons` - own coupons.
pub async fn list_coupons(
    State(state): State<AppState>,
    vendor: RequireVendor,
) -> Result<Json<Vec<Coupon>>, AppError> {
    let coupons = CouponRepository::new(state.pool())
        .list_for_vendor(vendor.vendor_id)
        .await?;
    Ok(Json(coupons))
}

/// `POST /vendor/coupons` - create a coupon.
pub async fn create_coupon(
    State(state): State<AppState>,
    vendor: RequireVendor,
    Json(body): Json<CouponRequest>,
) -> Result<(StatusCode, Json<Coupon>), AppError> {
    let fields = CouponFields {
        code: body.code,
        kind: body.kind,
        value: body.value,
        min_order_amount: body.min_order_amount,
        usage_limit: body.usage_limit,
        expires_at: body.expires_at,
    };
    let coupon = CouponRepository::new(state.pool())
        .create(vendor.vendor_id, &fields)
        .await?;
    Ok((StatusCode::CREATED, Json(coupon)))
}

/// `PATCH /vendor/coupons/{id}` - edit redemption limits or toggle the
/// active flag. Code, kind and value are fixed at creation.
pub async fn update_coupon(
    State(state): State<AppState>,
    vendor: RequireVendor,
    Path(id): Path<CouponId>,
    Json(body): Json<CouponPatch>,
) -> Result<Json<Coupon>, AppError> {
    let changes = CouponChanges {
        usage_limit: body.usage_limit,
        min_order_amount: body.min_order_amount,
        expires_at: body.expires_at,
        is_active: body.is_active,
    };
    let coupon = CouponRepository::new(state.pool())
        .update_limits(id, vendor.vendor_id, &changes)
        .await?;
    Ok(Json(coupon))
}

/// `DELETE /vendor/coupons/{id}` - deactivate a coupon.
pub async fn deactivate_coupon(
    State(state): State<AppState>,
    vendor: RequireVendor,
    Path(id): Path<CouponId>,
) -> Result<Json<Coupon>, AppError> {
    let coupon = CouponRepository::new(state.pool())
        .deactivate(id, vendor.vendor_id)
        .await?;
    Ok(Json(coupon))
}

/// `GET /vendor/orders` - orders containing the vendor's products.
pub async fn list_orders(
    State(state): State<AppState>,
    vendor: RequireVendor,
    Query(page): Query<PageParams>,
) -> Result<Json<Paginated<Order>>, AppError> {
    let orders = OrderRepository::new(state.pool())
        .list_for_vendor(vendor.vendor_id, page)
        .await?;
    Ok(Json(orders))
}

/// `POST /vendor/orders/{id}/advance` - advance an order one step along
/// the forward chain. A tracking number is required when the step enters
/// `shipped`.
pub async fn advance_order(
    State(state): State<AppState>,
    vendor: RequireVendor,
    Path(id): Path<OrderId>,
    Json(body): Json<AdvanceRequest>,
) -> Result<Json<Order>, AppError> {
    let repo = OrderRepository::new(state.pool());

    let order = repo.get(id).await?.ok_or(AppError::NotFound)?;
    let contains_vendor = repo
        .items(id)
        .await?
        .iter()
        .any(|item| item.vendor_id == vendor.vendor_id);
    if !contains_vendor {
        return Err(AppError::NotFound);
    }

    let next = order.status.next_forward().ok_or_else(|| {
        AppError::Conflict(format!("order is already {}", order.status))
    })?;

    let order = repo.transition(id, next, body.tracking_number).await?;
    Ok(Json(order))
}
