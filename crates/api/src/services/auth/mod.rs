//! Authentication: argon2 password hashing and the JWT session cookie.
//!
//! Sessions are stateless: a signed JWT carrying `sub`, `email` and `role`
//! claims lives in an httpOnly cookie for seven days. Handlers never hit the
//! database to authenticate a request; ownership checks use the `sub` claim.

mod error;

pub use error::AuthError;

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use attara_core::{UserId, UserRole};

use crate::models::User;

/// Name of the session cookie.
pub const AUTH_COOKIE: &str = "attara_token";

/// Session lifetime: seven days.
const TOKEN_TTL_DAYS: i64 = 7;

const MIN_PASSWORD_LENGTH: usize = 8;

/// JWT claims carried in the session cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID, stringified.
    pub sub: String,
    pub email: String,
    pub role: UserRole,
    /// Issued-at, unix seconds.
    pub iat: i64,
    /// Expiry, unix seconds.
    pub exp: i64,
}

impl Claims {
    /// Parse the `sub` claim back into a [`UserId`].
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidToken`] if the claim is not an integer.
    pub fn user_id(&self) -> Result<UserId, AuthError> {
        self.sub
            .parse::<i32>()
            .map(UserId::new)
            .map_err(|_| AuthError::InvalidToken)
    }
}

/// Issues and verifies session tokens and builds the session cookie.
#[derive(Clone)]
pub struct AuthService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    /// Production gates `Secure` + `SameSite=None`; development uses `Lax`
    /// so the cookie works over plain http.
    secure_cookies: bool,
}

impl AuthService {
    /// Build the service from the signing secret.
    #[must_use]
    pub fn new(jwt_secret: &SecretString, secure_cookies: bool) -> Self {
        let secret = jwt_secret.expose_secret().as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            secure_cookies,
        }
    }

    /// Mint a session token for a user.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Hash`] if signing fails.
    pub fn issue_token(&self, user: &User) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.as_i32().to_string(),
            email: user.email.to_string(),
            role: user.role,
            iat: now.timestamp(),
            exp: (now + Duration::days(TOKEN_TTL_DAYS)).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Hash(e.to_string()))
    }

    /// Verify a token and return its claims.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidToken`] for anything but a well-signed,
    /// unexpired token.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|_| AuthError::InvalidToken)
    }

    /// Build the httpOnly session cookie holding `token`.
    #[must_use]
    pub fn session_cookie(&self, token: String) -> Cookie<'static> {
        let mut cookie = Cookie::new(AUTH_COOKIE, token);
        cookie.set_http_only(true);
        cookie.set_path("/");
        cookie.set_max_age(time::Duration::days(TOKEN_TTL_DAYS));
        if self.secure_cookies {
            cookie.set_secure(true);
            cookie.set_same_site(SameSite::None);
        } else {
            cookie.set_same_site(SameSite::Lax);
        }
        cookie
    }

    /// Build an expired cookie that clears the session.
    #[must_use]
    pub fn clear_cookie(&self) -> Cookie<'static> {
        let mut cookie = Cookie::new(AUTH_COOKIE, "");
        cookie.set_http_only(true);
        cookie.set_path("/");
        cookie.set_max_age(time::Duration::ZERO);
        if self.secure_cookies {
            cookie.set_secure(true);
            cookie.set_same_site(SameSite::None);
        } else {
            cookie.set_same_site(SameSite::Lax);
        }
        cookie
    }
}

/// Hash a password with argon2id and a fresh random salt.
///
/// # Errors
///
/// Returns [`AuthError::WeakPassword`] for passwords under 8 characters and
/// [`AuthError::Hash`] if the backend fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hash(e.to_string()))
}

/// Verify a password against a stored argon2 hash.
///
/// # Errors
///
/// Returns [`AuthError::InvalidCredentials`] on mismatch and
/// [`AuthError::Hash`] if the stored hash cannot be parsed.
pub fn verify_password(password: &str, password_hash: &str) -> Result<(), AuthError> {
    let parsed = PasswordHash::new(password_hash).map_err(|e| AuthError::Hash(e.to_string()))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use attara_core::Email;

    fn test_user() -> User {
        User {
            id: UserId::new(42),
            email: Email::parse("amina@example.com").unwrap(),
            password_hash: String::new(),
            full_name: "Amina".to_owned(),
            role: UserRole::Customer,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn service() -> AuthService {
        AuthService::new(
            &SecretString::from("kJ8#mP2$vX9@qW4&nR7*tY0^zB5!cF3%"),
            false,
        )
    }

    #[test]
    fn test_password_roundtrip() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(verify_password("correct horse battery", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong password", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_weak_password_rejected() {
        assert!(matches!(
            hash_password("short"),
            Err(AuthError::WeakPassword(_))
        ));
    }

    #[test]
    fn test_token_roundtrip() {
        let svc = service();
        let token = svc.issue_token(&test_user()).unwrap();
        let claims = svc.verify_token(&token).unwrap();
        assert_eq!(claims.user_id().unwrap(), UserId::new(42));
        assert_eq!(claims.email, "amina@example.com");
        assert_eq!(claims.role, UserRole::Customer);
    }

    #[test]
    fn test_tampered_token_rejected() {
        let svc = service();
        let other = AuthService::new(
            &SecretString::from("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6%dE1"),
            false,
        );
        let token = other.issue_token(&test_user()).unwrap();
        assert!(matches!(
            svc.verify_token(&token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_cookie_flags() {
        let svc = service();
        let cookie = svc.session_cookie("tok".to_owned());
        assert_eq!(cookie.name(), AUTH_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));

        let secure = AuthService::new(
            &SecretString::from("kJ8#mP2$vX9@qW4&nR7*tY0^zB5!cF3%"),
            true,
        );
        let cookie = secure.session_cookie("tok".to_owned());
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::None));
    }
}
