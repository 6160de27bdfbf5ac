//! Public catalog routes.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};

use attara_core::{CategoryId, PageParams, Paginated, ProductId, VendorId};

use crate::db::products::ProductFilter;
use crate::db::{ProductRepository, ReviewRepository};
use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::models::Review;
use crate::models::product::Product;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ProductQuery {
    pub category_id: Option<CategoryId>,
    pub vendor_id: Option<VendorId>,
    pub search: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub rating: i32,
    pub comment: Option<String>,
}

/// `GET /products` - active products of approved vendors.
pub async fn index(
    State(state): State<AppState>,
    Query(page): Query<PageParams>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Paginated<Product>>, AppError> {
    let filter = ProductFilter {
        category_id: query.category_id,
        vendor_id: query.vendor_id,
        search: query.search,
        min_price: query.min_price,
        max_price: query.max_price,
    };
    let products = ProductRepository::new(state.pool())
        .list_public(&filter, page)
        .await?;
    Ok(Json(products))
}

/// `GET /products/{id}` - product detail with variants and approved reviews.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Value>, AppError> {
    let repo = ProductRepository::new(state.pool());
    let product = repo.get(id).await?.filter(|p| p.is_active).ok_or(AppError::NotFound)?;
    let variants = repo.variants(id).await?;
    let reviews = ReviewRepository::new(state.pool()).list_approved(id).await?;

    Ok(Json(json!({
        "product": product,
        "variants": variants,
        "reviews": reviews,
    })))
}

/// `POST /products/{id}/reviews` - submit a review for moderation.
pub async fn create_review(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<ProductId>,
    Json(body): Json<ReviewRequest>,
) -> Result<(StatusCode, Json<Review>), AppError> {
    let review = ReviewRepository::new(state.pool())
        .create(current.id, id, body.rating, body.comment.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(review)))
}
