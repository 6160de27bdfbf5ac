//! Admin moderation routes.
//!
//! Every handler takes the `RequireAdmin` extractor; listings use the typed
//! filter structs compiled through `sqlx::QueryBuilder`.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;

use attara_core::{
    CategoryId, OrderId, OrderStatus, PageParams, Paginated, PaymentStatus, ProductId, ReviewId,
    ReviewStatus, UserId, UserRole, VendorId, VendorStatus,
};

use crate::db::orders::OrderFilter;
use crate::db::users::UserFilter;
use crate::db::{
    CategoryRepository, OrderRepository, ProductRepository, ReviewRepository, UserRepository,
    VendorRepository,
};
use crate::error::AppError;
use crate::middleware::RequireAdmin;
use crate::models::order::Order;
use crate::models::product::Product;
use crate::models::{Category, Review, User, Vendor};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UserPatch {
    pub is_active: bool,
}

#[derive(Debug, Deserialize)]
pub struct VendorQuery {
    pub status: Option<VendorStatus>,
}

#[derive(Debug, Deserialize)]
pub struct VendorStatusRequest {
    pub status: VendorStatus,
}

#[derive(Debug, Deserialize)]
pub struct ProductPatch {
    pub is_active: bool,
}

#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    pub name: String,
    pub slug: String,
    pub parent_id: Option<CategoryId>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewQuery {
    pub status: Option<ReviewStatus>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewStatusRequest {
    pub status: ReviewStatus,
}

#[derive(Debug, Deserialize)]
pub struct OrderQuery {
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub user_id: Option<UserId>,
}

#[derive(Debug, Deserialize)]
pub struct OrderStatusRequest {
    pub status: OrderStatus,
    pub tracking_number: Option<String>,
}

/// `GET /admin/users` - paginated user listing with typed filters.
pub async fn list_users(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Query(page): Query<PageParams>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Paginated<User>>, AppError> {
    let filter = UserFilter {
        role: query.role,
        is_active: query.is_active,
        search: query.search,
    };
    let users = UserRepository::new(state.pool()).list(&filter, page).await?;
    Ok(Json(users))
}

/// `PATCH /admin/users/{id}` - activate or deactivate an account.
pub async fn patch_user(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<UserId>,
    Json(body): Json<UserPatch>,
) -> Result<Json<User>, AppError> {
    let repo = UserRepository::new(state.pool());
    repo.set_active(id, body.is_active).await?;
    repo.get_by_id(id).await?.map(Json).ok_or(AppError::NotFound)
}

/// `GET /admin/vendors` - paginated vendor listing, optionally by status.
pub async fn list_vendors(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Query(page): Query<PageParams>,
    Query(query): Query<VendorQuery>,
) -> Result<Json<Paginated<Vendor>>, AppError> {
    let vendors = VendorRepository::new(state.pool())
        .list(query.status, page)
        .await?;
    Ok(Json(vendors))
}

/// `POST /admin/vendors/{id}/status` - guarded moderation transition with
/// the role flip and product fan-out.
pub async fn set_vendor_status(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<VendorId>,
    Json(body): Json<VendorStatusRequest>,
) -> Result<Json<Vendor>, AppError> {
    let vendor = VendorRepository::new(state.pool())
        .set_status(id, body.status)
        .await?;
    Ok(Json(vendor))
}

/// `GET /admin/products` - every product, newest first.
pub async fn list_products(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Query(page): Query<PageParams>,
) -> Result<Json<Paginated<Product>>, AppError> {
    let products = ProductRepository::new(state.pool()).list_all(page).await?;
    Ok(Json(products))
}

/// `PATCH /admin/products/{id}` - force activate or deactivate a product.
pub async fn patch_product(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<ProductId>,
    Json(body): Json<ProductPatch>,
) -> Result<Json<Product>, AppError> {
    let product = ProductRepository::new(state.pool())
        .set_active(id, body.is_active)
        .await?;
    Ok(Json(product))
}

/// `POST /admin/categories` - create a category, optionally under a parent.
pub async fn create_category(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Json(body): Json<CategoryRequest>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    let category = CategoryRepository::new(state.pool())
        .create(&body.name, &body.slug, body.parent_id)
        .await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// `PATCH /admin/categories/{id}` - rename, re-slug or re-parent.
pub async fn update_category(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<CategoryId>,
    Json(body): Json<CategoryRequest>,
) -> Result<Json<Category>, AppError> {
    let category = CategoryRepository::new(state.pool())
        .update(id, &body.name, &body.slug, body.parent_id)
        .await?;
    Ok(Json(category))
}

/// `DELETE /admin/categories/{id}` - soft-delete; products keep the
/// reference but the category leaves the public tree.
pub async fn delete_category(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<CategoryId>,
) -> Result<StatusCode, AppError> {
    CategoryRepository::new(state.pool()).soft_delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /admin/reviews` - paginated review listing, optionally by status.
pub async fn list_reviews(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Query(page): Query<PageParams>,
    Query(query): Query<ReviewQuery>,
) -> Result<Json<Paginated<Review>>, AppError> {
    let reviews = ReviewRepository::new(state.pool())
        .list(query.status, page)
        .await?;
    Ok(Json(reviews))
}

/// `POST /admin/reviews/{id}/status` - approve or reject a review.
pub async fn set_review_status(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<ReviewId>,
    Json(body): Json<ReviewStatusRequest>,
) -> Result<Json<Review>, AppError> {
    let review = ReviewRepository::new(state.pool())
        .set_status(id, body.status)
        .await?;
    Ok(Json(review))
}

/// `GET /admin/orders` - paginated order listing with typed filters.
pub async fn list_orders(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Query(page): Query<PageParams>,
    Query(query): Query<OrderQuery>,
) -> Result<Json<Paginated<Order>>, AppError> {
    let filter = OrderFilter {
        status: query.status,
        payment_status: query.payment_status,
        user_id: query.user_id,
    };
    let orders = OrderRepository::new(state.pool()).list(&filter, page).await?;
    Ok(Json(orders))
}

/// `POST /admin/orders/{id}/status` - any guarded transition, including
/// cancellation from `pending`.
pub async fn set_order_status(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<OrderId>,
    Json(body): Json<OrderStatusRequest>,
) -> Result<Json<Order>, AppError> {
    let order = OrderRepository::new(state.pool())
        .transition(id, body.status, body.tracking_number)
        .await?;
    Ok(Json(order))
}
