//! Wallet and coin ledger models.

use chrono::{DateTime, Utc};
use serde::Serialize;

use attara_core::{CoinSource, CoinTransactionId, CoinTransactionType, OrderId, UserId, WalletId};

/// A wallet row. `balance` is denormalized; it always equals the
/// `balance_after` of the newest ledger entry because both are written in
/// one transaction.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Wallet {
    pub id: WalletId,
    pub user_id: UserId,
    pub balance: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An append-only coin ledger entry.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CoinTransaction {
    pub id: CoinTransactionId,
    pub wallet_id: WalletId,
    pub tx_type: CoinTransactionType,
    pub source: CoinSource,
    pub amount: i32,
    pub balance_after: i32,
    pub order_id: Option<OrderId>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
