//! Public category routes.

use axum::Json;
use axum::extract::{Path, State};

use attara_core::CategoryId;

use crate::db::CategoryRepository;
use crate::error::AppError;
use crate::models::Category;
use crate::state::AppState;

/// `GET /categories` - the active category tree, parents first.
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Category>>, AppError> {
    let categories = CategoryRepository::new(state.pool()).list_active().await?;
    Ok(Json(categories))
}

/// `GET /categories/{id}` - a single active category.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<Json<Category>, AppError> {
    CategoryRepository::new(state.pool())
        .get(id)
        .await?
        .filter(|c| c.is_active)
        .map(Json)
        .ok_or(AppError::NotFound)
}
