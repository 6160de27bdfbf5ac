//! Admin user management commands.
//!
//! # Usage
//!
//! ```bash
//! attara-cli admin create -e admin@attara.shop -n "Site Admin" -p <password>
//! ```
//!
//! # Environment Variables
//!
//! - `API_DATABASE_URL` - `PostgreSQL` connection string

use secrecy::ExposeSecret;
use sqlx::PgPool;
use thiserror::Error;

use attara_api::services::auth::{AuthError, hash_password};
use attara_core::Email;

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Required environment variable is missing.
    #[error("{0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] attara_core::EmailError),

    /// Weak password or hashing failure.
    #[error("Password error: {0}")]
    Password(#[from] AuthError),

    /// User already exists.
    #[error("User already exists with email: {0}")]
    UserExists(String),
}

/// Create a new admin user with a wallet, like registration does.
///
/// # Errors
///
/// Returns `AdminError` for a taken email, a weak password, or a database
/// failure.
pub async fn create_user(email: &str, name: &str, password: &str) -> Result<i32, AdminError> {
    let email = Email::parse(email)?;
    let password_hash = hash_password(password)?;

    let database_url = super::database_url().map_err(AdminError::MissingEnvVar)?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    let existing: Option<i32> = sqlx::query_scalar("SELECT id FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(&pool)
        .await?;
    if existing.is_some() {
        return Err(AdminError::UserExists(email.to_string()));
    }

    let mut tx = pool.begin().await?;

    let user_id: i32 = sqlx::query_scalar(
        "INSERT INTO users (email, password_hash, full_name, role)
         VALUES ($1, $2, $3, 'admin')
         RETURNING id",
    )
    .bind(&email)
    .bind(&password_hash)
    .bind(name)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("INSERT INTO wallets (user_id) VALUES ($1)")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!("Admin user created! ID: {}, Email: {}", user_id, email);
    Ok(user_id)
}
