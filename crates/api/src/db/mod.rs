//! Database access for the Attara marketplace.
//!
//! One repository per aggregate, all speaking `RepositoryError`. Queries use
//! the runtime sqlx API; multi-step writes (default-address flips, vendor
//! moderation fan-out, checkout, coin ledger) run inside transactions so the
//! invariants they maintain cannot be half-applied.
//!
//! # Migrations
//!
//! Migrations live in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p attara-cli -- migrate
//! ```

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub mod addresses;
pub mod carts;
pub mod categories;
pub mod coupons;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod users;
pub mod vendors;
pub mod wallets;

pub use addresses::AddressRepository;
pub use carts::CartRepository;
pub use categories::CategoryRepository;
pub use coupons::CouponRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use reviews::ReviewRepository;
pub use users::UserRepository;
pub use vendors::VendorRepository;
pub use wallets::WalletRepository;

/// Errors from repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email, exhausted coupon).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// A business rule rejected the operation (surfaced as a bad request).
    #[error("invalid operation: {0}")]
    Invalid(String),

    /// A state-machine guard rejected the requested transition.
    #[error("illegal transition: {0}")]
    IllegalTransition(String),

    /// The wallet does not hold enough coins.
    #[error("insufficient coin balance")]
    InsufficientBalance,
}

impl RepositoryError {
    /// Map a unique-violation database error to `Conflict`, everything else
    /// to `Database`.
    pub(crate) fn from_unique(e: sqlx::Error, message: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_unique_violation()
        {
            return Self::Conflict(message.to_owned());
        }
        Self::Database(e)
    }

    /// Map a check-violation database error to `Invalid`, everything else
    /// to `Database`.
    pub(crate) fn from_check(e: sqlx::Error, message: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_check_violation()
        {
            return Self::Invalid(message.to_owned());
        }
        Self::Database(e)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
