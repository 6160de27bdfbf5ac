//! Registration, login and session routes.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use serde_json::{Value, json};

use attara_core::Email;

use crate::db::UserRepository;
use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::models::User;
use crate::services::auth::{hash_password, verify_password};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

fn user_json(user: &User) -> Value {
    json!({
        "id": user.id,
        "email": user.email,
        "full_name": user.full_name,
        "role": user.role,
    })
}

/// `POST /auth/register` - create an account and start a session.
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<Value>), AppError> {
    let email = Email::parse(&body.email)?;
    if body.full_name.trim().is_empty() {
        return Err(AppError::BadRequest("full name must not be empty".to_owned()));
    }
    let password_hash = hash_password(&body.password)?;

    let user = UserRepository::new(state.pool())
        .create(&email, &password_hash, body.full_name.trim())
        .await?;

    let token = state.auth().issue_token(&user)?;
    let jar = jar.add(state.auth().session_cookie(token));
    Ok((StatusCode::CREATED, jar, Json(user_json(&user))))
}

/// `POST /auth/login` - verify credentials and set the session cookie.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<(CookieJar, Json<Value>), AppError> {
    let email = Email::parse(&body.email).map_err(|_| AppError::Unauthorized)?;

    let user = UserRepository::new(state.pool())
        .get_by_email(&email)
        .await?
        .ok_or(AppError::Unauthorized)?;

    verify_password(&body.password, &user.password_hash).map_err(|_| AppError::Unauthorized)?;

    if !user.is_active {
        return Err(AppError::Forbidden("account is disabled".to_owned()));
    }

    let token = state.auth().issue_token(&user)?;
    let jar = jar.add(state.auth().session_cookie(token));
    Ok((jar, Json(user_json(&user))))
}

/// `POST /auth/logout` - clear the session cookie.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Json<Value>) {
    let jar = jar.add(state.auth().clear_cookie());
    (jar, Json(json!({ "ok": true })))
}

/// `GET /auth/me` - the authenticated user's profile.
pub async fn me(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<Value>, AppError> {
    let user = UserRepository::new(state.pool())
        .get_by_id(current.id)
        .await?
        .ok_or(AppError::Unauthorized)?;
    Ok(Json(user_json(&user)))
}
