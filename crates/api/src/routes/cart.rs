//! Cart routes.
//!
//! Every read prices the cart against live catalog rows, so flash sales and
//! price edits show up without touching stored cart state.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;

use attara_core::{CartItemId, ProductId, VariantId};

use crate::db::CartRepository;
use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::models::cart::CartView;
use crate::services::pricing::price_cart;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: ProductId,
    pub variant_id: Option<VariantId>,
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: i32,
}

async fn cart_view(state: &AppState, current: &CurrentUser) -> Result<CartView, AppError> {
    let repo = CartRepository::new(state.pool());
    let cart = repo.get_or_create(current.id).await?;
    let items = repo.priced_items(cart.id).await?;
    let (lines, totals) = price_cart(&items, chrono::Utc::now());
    Ok(CartView {
        id: cart.id,
        items: lines,
        subtotal: totals.subtotal,
        tax: totals.tax,
        shipping_fee: totals.shipping_fee,
        total: totals.total,
        coins_earnable: totals.coins_earnable,
    })
}

/// `GET /cart` - the priced cart, created lazily on first read.
pub async fn show(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<CartView>, AppError> {
    Ok(Json(cart_view(&state, &current).await?))
}

/// `POST /cart/items` - add a product (or variant) to the cart, merging
/// into an existing line.
pub async fn add_item(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(body): Json<AddItemRequest>,
) -> Result<(StatusCode, Json<CartView>), AppError> {
    let repo = CartRepository::new(state.pool());
    let cart = repo.get_or_create(current.id).await?;
    repo.add_item(cart.id, body.product_id, body.variant_id, body.quantity)
        .await?;
    Ok((StatusCode::CREATED, Json(cart_view(&state, &current).await?)))
}

/// `PATCH /cart/items/{id}` - change a line's quantity.
pub async fn update_item(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<CartItemId>,
    Json(body): Json<UpdateItemRequest>,
) -> Result<Json<CartView>, AppError> {
    CartRepository::new(state.pool())
        .update_item(id, current.id, body.quantity)
        .await?;
    Ok(Json(cart_view(&state, &current).await?))
}

/// `DELETE /cart/items/{id}` - remove a line.
pub async fn remove_item(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<CartItemId>,
) -> Result<Json<CartView>, AppError> {
    CartRepository::new(state.pool())
        .remove_item(id, current.id)
        .await?;
    Ok(Json(cart_view(&state, &current).await?))
}

/// `DELETE /cart` - empty the cart.
pub async fn clear(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<CartView>, AppError> {
    CartRepository::new(state.pool()).clear(current.id).await?;
    Ok(Json(cart_view(&state, &current).await?))
}
