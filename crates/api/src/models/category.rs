//! Category model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use attara_core::CategoryId;

/// A category row. Categories form a tree via `parent_id` and are
/// soft-deleted by clearing `is_active`.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    pub parent_id: Option<CategoryId>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
