//! Auth service errors.

use thiserror::Error;

/// Errors from registration, login and token verification.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email/password pair did not match.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Registration with an email that already has an account.
    #[error("account already exists")]
    AccountExists,

    /// Password failed the strength check.
    #[error("weak password: {0}")]
    WeakPassword(String),

    /// Email failed structural validation.
    #[error("invalid email: {0}")]
    InvalidEmail(String),

    /// The account is deactivated.
    #[error("account is disabled")]
    AccountDisabled,

    /// Missing, malformed, tampered or expired token.
    #[error("invalid token")]
    InvalidToken,

    /// Password hashing backend failure.
    #[error("hashing error: {0}")]
    Hash(String),
}
