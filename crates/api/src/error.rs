//! HTTP error surface.
//!
//! Every handler returns `Result<_, AppError>`; the `IntoResponse` impl
//! maps each variant to a status code and a JSON `{"error": "..."}` body.
//! Internal failures are logged and reported to Sentry without leaking
//! detail to the client.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use attara_core::EmailError;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::pricing::PricingError;

/// Application-level error returned by route handlers.
#[derive(Debug, Error)]
pub enum AppError {
    /// Request was malformed or violated a business rule.
    #[error("{0}")]
    BadRequest(String),

    /// No or invalid session.
    #[error("authentication required")]
    Unauthorized,

    /// Authenticated but not allowed.
    #[error("{0}")]
    Forbidden(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Write conflicted with existing state.
    #[error("{0}")]
    Conflict(String),

    /// Unexpected failure; details stay server-side.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
            sentry::capture_message(&self.to_string(), sentry::Level::Error);
            "internal server error".to_owned()
        } else {
            self.to_string()
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<RepositoryError> for AppError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => Self::NotFound,
            RepositoryError::Conflict(msg) => Self::Conflict(msg),
            RepositoryError::Invalid(msg) => Self::BadRequest(msg),
            RepositoryError::IllegalTransition(msg) => Self::Conflict(msg),
            RepositoryError::InsufficientBalance => {
                Self::BadRequest("insufficient coin balance".to_owned())
            }
            RepositoryError::Database(e) => Self::Internal(e.to_string()),
            RepositoryError::DataCorruption(msg) => Self::Internal(msg),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidCredentials => Self::Unauthorized,
            AuthError::AccountExists => Self::Conflict(e.to_string()),
            AuthError::WeakPassword(_) | AuthError::InvalidEmail(_) => {
                Self::BadRequest(e.to_string())
            }
            AuthError::AccountDisabled => Self::Forbidden(e.to_string()),
            AuthError::InvalidToken => Self::Unauthorized,
            AuthError::Hash(msg) => Self::Internal(msg),
        }
    }
}

impl From<PricingError> for AppError {
    fn from(e: PricingError) -> Self {
        Self::BadRequest(e.to_string())
    }
}

impl From<EmailError> for AppError {
    fn from(e: EmailError) -> Self {
        Self::BadRequest(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::from(RepositoryError::NotFound).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::from(RepositoryError::InsufficientBalance).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(RepositoryError::IllegalTransition("x".into())).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::from(AuthError::InvalidToken).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::from(PricingError::EmptyCart).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_internal_detail_is_not_leaked() {
        let response = AppError::Internal("connection refused".to_owned()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
