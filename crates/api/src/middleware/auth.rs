//! Authentication extractors.
//!
//! `CurrentUser` reads the session cookie and verifies the JWT without a
//! database round trip. `RequireAdmin` and `RequireVendor` layer role
//! checks on top; the vendor check hits the database because approval is
//! mutable state, not a claim.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::CookieJar;

use attara_core::{UserId, UserRole, VendorId, VendorStatus};

use crate::db::VendorRepository;
use crate::error::AppError;
use crate::services::auth::AUTH_COOKIE;
use crate::state::AppState;

/// The authenticated user, taken from verified JWT claims.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: UserId,
    pub email: String,
    pub role: UserRole,
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar.get(AUTH_COOKIE).ok_or(AppError::Unauthorized)?.value();
        let claims = state
            .auth()
            .verify_token(token)
            .map_err(|_| AppError::Unauthorized)?;
        Ok(Self {
            id: claims.user_id()?,
            email: claims.email,
            role: claims.role,
        })
    }
}

/// The authenticated user, required to be an admin.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub CurrentUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        if user.role != UserRole::Admin {
            return Err(AppError::Forbidden("admin access required".to_owned()));
        }
        Ok(Self(user))
    }
}

/// The authenticated user together with their approved vendor profile.
///
/// Approval is checked against the database on every request, so a
/// suspension takes effect immediately rather than at token expiry.
#[derive(Debug, Clone)]
pub struct RequireVendor {
    pub user: CurrentUser,
    pub vendor_id: VendorId,
}

impl FromRequestParts<AppState> for RequireVendor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;

        let vendor = VendorRepository::new(state.pool())
            .get_by_user(user.id)
            .await?
            .ok_or_else(|| AppError::Forbidden("vendor profile required".to_owned()))?;

        if vendor.status != VendorStatus::Approved {
            return Err(AppError::Forbidden(format!(
                "vendor account is {}",
                vendor.status
            )));
        }

        Ok(Self {
            user,
            vendor_id: vendor.id,
        })
    }
}
