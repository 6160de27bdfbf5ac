//! Category repository.
//!
//! Categories form a tree via `parent_id`. The cycle check rejects a
//! category adopting itself or its own immediate parent becoming itself;
//! deeper cycles are prevented by only ever re-parenting one level at a
//! time through this API.

use sqlx::PgPool;

use attara_core::CategoryId;

use super::RepositoryError;
use crate::models::Category;

const CATEGORY_COLUMNS: &str = "id, name, slug, parent_id, is_active, created_at, updated_at";

/// Repository for catalog categories.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All active categories, parents before children, then by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_active(&self) -> Result<Vec<Category>, RepositoryError> {
        let categories = sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories
             WHERE is_active
             ORDER BY parent_id NULLS FIRST, name ASC"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(categories)
    }

    /// Fetch a category by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        let category = sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(category)
    }

    /// Create a category.
    ///
    /// # Errors
    ///
    /// - `Invalid` for an empty name or a missing parent.
    /// - `Conflict` if the slug is taken.
    pub async fn create(
        &self,
        name: &str,
        slug: &str,
        parent_id: Option<CategoryId>,
    ) -> Result<Category, RepositoryError> {
        if name.trim().is_empty() {
            return Err(RepositoryError::Invalid(
                "category name must not be empty".to_owned(),
            ));
        }

        if let Some(parent_id) = parent_id {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1)")
                    .bind(parent_id)
                    .fetch_one(self.pool)
                    .await?;
            if !exists {
                return Err(RepositoryError::Invalid(
                    "parent category does not exist".to_owned(),
                ));
            }
        }

        let category = sqlx::query_as::<_, Category>(&format!(
            "INSERT INTO categories (name, slug, parent_id)
             VALUES ($1, $2, $3)
             RETURNING {CATEGORY_COLUMNS}"
        ))
        .bind(name.trim())
        .bind(slug)
        .bind(parent_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "category slug already exists"))?;

        Ok(category)
    }

    /// Update a category, optionally re-parenting it.
    ///
    /// # Errors
    ///
    /// - `Invalid` if the category would become its own parent, or its
    ///   parent would be one of its children.
    /// - `Conflict` if the slug is taken.
    /// - `NotFound` if the category doesn't exist.
    pub async fn update(
        &self,
        id: CategoryId,
        name: &str,
        slug: &str,
        parent_id: Option<CategoryId>,
    ) -> Result<Category, RepositoryError> {
        if name.trim().is_empty() {
            return Err(RepositoryError::Invalid(
                "category name must not be empty".to_owned(),
            ));
        }

        if let Some(parent_id) = parent_id {
            if parent_id == id {
                return Err(RepositoryError::Invalid(
                    "category cannot be its own parent".to_owned(),
                ));
            }
            let parent_of_parent: Option<Option<CategoryId>> =
                sqlx::query_scalar("SELECT parent_id FROM categories WHERE id = $1")
                    .bind(parent_id)
                    .fetch_optional(self.pool)
                    .await?;
            match parent_of_parent {
                None => {
                    return Err(RepositoryError::Invalid(
                        "parent category does not exist".to_owned(),
                    ));
                }
                Some(Some(grandparent)) if grandparent == id => {
                    return Err(RepositoryError::Invalid(
                        "category cannot adopt its own child".to_owned(),
                    ));
                }
                Some(_) => {}
            }
        }

        sqlx::query_as::<_, Category>(&format!(
            "UPDATE categories SET name = $1, slug = $2, parent_id = $3, updated_at = now()
             WHERE id = $4
             RETURNING {CATEGORY_COLUMNS}"
        ))
        .bind(name.trim())
        .bind(slug)
        .bind(parent_id)
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "category slug already exists"))?
        .ok_or(RepositoryError::NotFound)
    }

    /// Soft-delete a category. Products keep their reference; the category
    /// just leaves the public tree.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category doesn't exist.
    pub async fn soft_delete(&self, id: CategoryId) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE categories SET is_active = FALSE, updated_at = now() WHERE id = $1")
                .bind(id)
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
