//! Review model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use attara_core::{ProductId, ReviewId, ReviewStatus, UserId};

/// A product review row (one per user/product pair).
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Review {
    pub id: ReviewId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub rating: i32,
    pub comment: Option<String>,
    pub status: ReviewStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
