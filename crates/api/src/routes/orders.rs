//! Checkout and order routes.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use attara_core::{AddressId, OrderId, PageParams, Paginated, PaymentMethod};

use crate::db::orders::{NewOrder, NewOrderItem};
use crate::db::{AddressRepository, CartRepository, CouponRepository, OrderRepository};
use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::models::order::{Order, OrderView};
use crate::services::codes::generate_order_number;
use crate::services::invoice::render_invoice;
use crate::services::pricing::{CheckoutOptions, price_checkout};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub address_id: AddressId,
    pub payment_method: PaymentMethod,
    pub coupon_code: Option<String>,
    #[serde(default)]
    pub coins_to_use: i32,
    #[serde(default)]
    pub gift_wrapping: bool,
}

/// `POST /orders/checkout` - snapshot the cart into an order.
pub async fn checkout(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(body): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<OrderView>), AppError> {
    let now = chrono::Utc::now();
    let cart_repo = CartRepository::new(state.pool());
    let cart = cart_repo.get_or_create(current.id).await?;
    let items = cart_repo.priced_items(cart.id).await?;

    let coupon = match &body.coupon_code {
        Some(code) => {
            let coupon = CouponRepository::new(state.pool())
                .get_by_code(code)
                .await?
                .ok_or_else(|| AppError::BadRequest("invalid coupon code".to_owned()))?;
            if coupon.user_id.is_some_and(|owner| owner != current.id) {
                return Err(AppError::BadRequest("invalid coupon code".to_owned()));
            }
            Some(coupon)
        }
        None => None,
    };
    let coupon_id = coupon.as_ref().map(|c| c.id);

    let options = CheckoutOptions {
        coupon,
        coins_to_use: body.coins_to_use,
        gift_wrapping: body.gift_wrapping,
    };
    let (lines, totals) = price_checkout(&items, &options, now)?;

    let order_items = items
        .iter()
        .zip(&lines)
        .map(|(item, line)| NewOrderItem {
            product_id: item.product_id,
            variant_id: item.variant_id,
            vendor_id: item.vendor_id,
            product_name: item.product_name.clone(),
            variant_name: item.variant_name.clone(),
            unit_price: line.unit_price,
            quantity: item.quantity,
        })
        .collect();

    let repo = OrderRepository::new(state.pool());
    let order = repo
        .create_checkout(NewOrder {
            order_number: generate_order_number(now),
            user_id: current.id,
            address_id: body.address_id,
            payment_method: body.payment_method,
            coupon_id,
            totals,
            items: order_items,
        })
        .await?;

    let items = repo.items(order.id).await?;
    Ok((StatusCode::CREATED, Json(OrderView { order, items })))
}

/// `GET /orders` - own orders, newest first.
pub async fn list(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(page): Query<PageParams>,
) -> Result<Json<Paginated<Order>>, AppError> {
    let orders = OrderRepository::new(state.pool())
        .list_for_user(current.id, page)
        .await?;
    Ok(Json(orders))
}

async fn own_order_view(
    state: &AppState,
    current: &CurrentUser,
    id: OrderId,
) -> Result<OrderView, AppError> {
    let view = OrderRepository::new(state.pool())
        .get_view(id)
        .await?
        .ok_or(AppError::NotFound)?;
    if view.order.user_id != current.id {
        return Err(AppError::NotFound);
    }
    Ok(view)
}

/// `GET /orders/{id}` - own order with items.
pub async fn get(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderView>, AppError> {
    Ok(Json(own_order_view(&state, &current, id).await?))
}

/// `POST /orders/{id}/cancel` - cancel a pending order, refunding any
/// coins spent at checkout.
pub async fn cancel(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>, AppError> {
    let order = OrderRepository::new(state.pool())
        .cancel_own(id, current.id)
        .await?;
    Ok(Json(order))
}

/// `GET /orders/{id}/invoice` - plain-text invoice for an own order.
pub async fn invoice(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<OrderId>,
) -> Result<Response, AppError> {
    let view = own_order_view(&state, &current, id).await?;
    let address = AddressRepository::new(state.pool())
        .get(view.order.address_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let body = render_invoice(&view.order, &view.items, &address);
    Ok(([(CONTENT_TYPE, "text/plain; charset=utf-8")], body).into_response())
}
