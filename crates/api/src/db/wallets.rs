//! Wallet repository and the coin ledger.
//!
//! `apply_coin_change` is the single write path for coins: it moves the
//! denormalized balance and appends the ledger row on the same connection,
//! inside whatever transaction the caller holds. The invariant
//! `wallet.balance == SUM(ledger.amount)` therefore holds by construction.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use attara_core::{
    CoinSource, CoinTransactionType, MIN_COIN_REDEMPTION, OrderId, PageParams, Paginated, UserId,
    WalletId,
};
use rust_decimal::Decimal;

use super::RepositoryError;
use crate::models::{CoinTransaction, Coupon, Wallet};

const WALLET_COLUMNS: &str = "id, user_id, balance, created_at, updated_at";

/// Apply a signed coin delta to a user's wallet and append the ledger row.
///
/// Positive `delta` credits, negative debits. Returns the wallet ID and new
/// balance. Must run on the caller's open transaction so the two writes
/// commit or roll back together.
///
/// # Errors
///
/// - `NotFound` if the user has no wallet.
/// - `InsufficientBalance` if a debit would take the balance negative.
pub(crate) async fn apply_coin_change(
    conn: &mut PgConnection,
    user_id: UserId,
    tx_type: CoinTransactionType,
    source: CoinSource,
    delta: i32,
    order_id: Option<OrderId>,
) -> Result<(WalletId, i32), RepositoryError> {
    let updated: Option<(WalletId, i32)> = sqlx::query_as(
        "UPDATE wallets SET balance = balance + $1, updated_at = now()
         WHERE user_id = $2 AND balance + $1 >= 0
         RETURNING id, balance",
    )
    .bind(delta)
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await?;

    let (wallet_id, balance) = match updated {
        Some(row) => row,
        None => {
            let exists: Option<i32> =
                sqlx::query_scalar("SELECT balance FROM wallets WHERE user_id = $1")
                    .bind(user_id)
                    .fetch_optional(&mut *conn)
                    .await?;
            return Err(match exists {
                Some(_) => RepositoryError::InsufficientBalance,
                None => RepositoryError::NotFound,
            });
        }
    };

    sqlx::query(
        "INSERT INTO coin_transactions (wallet_id, tx_type, source, amount, balance_after, order_id)
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(wallet_id)
    .bind(tx_type)
    .bind(source)
    .bind(delta)
    .bind(balance)
    .bind(order_id)
    .execute(&mut *conn)
    .await?;

    Ok((wallet_id, balance))
}

/// Repository for wallets and coin redemption.
pub struct WalletRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> WalletRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Fetch a user's wallet. Wallets are created at registration, so a
    /// missing row is `NotFound` rather than an implicit create.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the wallet doesn't exist.
    pub async fn get_by_user(&self, user_id: UserId) -> Result<Wallet, RepositoryError> {
        sqlx::query_as::<_, Wallet>(&format!(
            "SELECT {WALLET_COLUMNS} FROM wallets WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Paginated ledger for a user, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn transactions(
        &self,
        user_id: UserId,
        page: PageParams,
    ) -> Result<Paginated<CoinTransaction>, RepositoryError> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM coin_transactions t
             JOIN wallets w ON w.id = t.wallet_id
             WHERE w.user_id = $1",
        )
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;

        let rows = sqlx::query_as::<_, CoinTransaction>(
            "SELECT t.id, t.wallet_id, t.tx_type, t.source, t.amount, t.balance_after,
                    t.order_id, t.expires_at, t.created_at
             FROM coin_transactions t
             JOIN wallets w ON w.id = t.wallet_id
             WHERE w.user_id = $1
             ORDER BY t.created_at DESC, t.id DESC
             LIMIT $2 OFFSET $3",
        )
        .bind(user_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.pool)
        .await?;

        Ok(Paginated::new(rows, total, page))
    }

    /// Redeem coins into a single-use fixed coupon restricted to the user.
    ///
    /// Spends the coins (ledger + balance, one transaction) and mints a
    /// coupon worth 1 AED per coin, expiring after `expiry_days`.
    ///
    /// # Errors
    ///
    /// - `Invalid` if `coins` is below the minimum redemption.
    /// - `InsufficientBalance` if the wallet holds fewer coins.
    /// - `Conflict` if the generated code collides (retry with a new code).
    pub async fn redeem(
        &self,
        user_id: UserId,
        coins: i32,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(Coupon, i32), RepositoryError> {
        if coins < MIN_COIN_REDEMPTION {
            return Err(RepositoryError::Invalid(format!(
                "minimum redemption is {MIN_COIN_REDEMPTION} coins"
            )));
        }

        let mut tx = self.pool.begin().await?;

        let (_, balance) = apply_coin_change(
            &mut tx,
            user_id,
            CoinTransactionType::Spent,
            CoinSource::Redemption,
            -coins,
            None,
        )
        .await?;

        let coupon = sqlx::query_as::<_, Coupon>(
            "INSERT INTO coupons (code, user_id, kind, value, usage_limit, expires_at)
             VALUES ($1, $2, 'fixed', $3, 1, $4)
             RETURNING id, code, vendor_id, user_id, kind, value, min_order_amount,
                       usage_limit, used_count, expires_at, is_active, created_at",
        )
        .bind(code)
        .bind(user_id)
        .bind(Decimal::from(coins))
        .bind(expires_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "coupon code already exists"))?;

        tx.commit().await?;
        Ok((coupon, balance))
    }
}
