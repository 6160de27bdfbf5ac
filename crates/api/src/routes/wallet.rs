//! Coin wallet routes.

use axum::Json;
use axum::extract::{Query, State};
use chrono::{Duration, Utc};
use serde::Deserialize;
use serde_json::{Value, json};

use attara_core::{PageParams, Paginated};

use crate::db::WalletRepository;
use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::models::CoinTransaction;
use crate::services::codes::generate_coupon_code;
use crate::state::AppState;

/// Redemption coupons expire after 90 days.
const REDEMPTION_COUPON_DAYS: i64 = 90;

#[derive(Debug, Deserialize)]
pub struct RedeemRequest {
    pub coins: i32,
}

/// `GET /wallet` - balance plus the most recent ledger entries.
pub async fn show(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<Value>, AppError> {
    let repo = WalletRepository::new(state.pool());
    let wallet = repo.get_by_user(current.id).await?;
    let recent = repo.transactions(current.id, PageParams::default()).await?;
    Ok(Json(json!({
        "balance": wallet.balance,
        "recent_transactions": recent.data,
    })))
}

/// `GET /wallet/transactions` - paginated ledger, newest first.
pub async fn transactions(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(page): Query<PageParams>,
) -> Result<Json<Paginated<CoinTransaction>>, AppError> {
    let ledger = WalletRepository::new(state.pool())
        .transactions(current.id, page)
        .await?;
    Ok(Json(ledger))
}

/// `POST /wallet/redeem` - convert coins into a single-use fixed coupon.
pub async fn redeem(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(body): Json<RedeemRequest>,
) -> Result<Json<Value>, AppError> {
    let code = generate_coupon_code();
    let expires_at = Utc::now() + Duration::days(REDEMPTION_COUPON_DAYS);

    let (coupon, balance) = WalletRepository::new(state.pool())
        .redeem(current.id, body.coins, &code, expires_at)
        .await?;

    Ok(Json(json!({
        "coupon": coupon,
        "balance": balance,
    })))
}
