//! User account model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use attara_core::{Email, UserId, UserRole};

/// A user account row.
///
/// The password hash is never serialized into API responses.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub full_name: String,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
