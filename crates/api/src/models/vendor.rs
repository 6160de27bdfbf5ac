//! Vendor profile model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use attara_core::{UserId, VendorId, VendorStatus};

/// A vendor profile row (1:1 with a user).
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Vendor {
    pub id: VendorId,
    pub user_id: UserId,
    pub store_name: String,
    pub description: Option<String>,
    pub status: VendorStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
