//! Review repository.
//!
//! Reviews enter `pending` and only show publicly once an admin approves
//! them. One review per user/product pair, enforced by a unique index.

use sqlx::{PgPool, Postgres, QueryBuilder};

use attara_core::{PageParams, Paginated, ProductId, ReviewId, ReviewStatus, UserId};

use super::RepositoryError;
use crate::models::Review;

const REVIEW_COLUMNS: &str = "id, user_id, product_id, rating, comment, status, created_at, \
     updated_at";

/// Repository for product reviews.
pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Submit a review. Ratings run 1-5; moderation starts at `pending`.
    ///
    /// # Errors
    ///
    /// - `Invalid` for an out-of-range rating.
    /// - `NotFound` if the product doesn't exist or is inactive.
    /// - `Conflict` if the user already reviewed this product.
    pub async fn create(
        &self,
        user_id: UserId,
        product_id: ProductId,
        rating: i32,
        comment: Option<&str>,
    ) -> Result<Review, RepositoryError> {
        if !(1..=5).contains(&rating) {
            return Err(RepositoryError::Invalid(
                "rating must be between 1 and 5".to_owned(),
            ));
        }

        let active: Option<bool> =
            sqlx::query_scalar("SELECT is_active FROM products WHERE id = $1")
                .bind(product_id)
                .fetch_optional(self.pool)
                .await?;
        if active != Some(true) {
            return Err(RepositoryError::NotFound);
        }

        let review = sqlx::query_as::<_, Review>(&format!(
            "INSERT INTO reviews (user_id, product_id, rating, comment)
             VALUES ($1, $2, $3, $4)
             RETURNING {REVIEW_COLUMNS}"
        ))
        .bind(user_id)
        .bind(product_id)
        .bind(rating)
        .bind(comment)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "product already reviewed"))?;

        Ok(review)
    }

    /// Approved reviews of a product, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_approved(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<Review>, RepositoryError> {
        let reviews = sqlx::query_as::<_, Review>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews
             WHERE product_id = $1 AND status = 'approved'
             ORDER BY created_at DESC"
        ))
        .bind(product_id)
        .fetch_all(self.pool)
        .await?;
        Ok(reviews)
    }

    /// Paginated moderation listing, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        status: Option<ReviewStatus>,
        page: PageParams,
    ) -> Result<Paginated<Review>, RepositoryError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM reviews WHERE TRUE");
        let mut query = QueryBuilder::<Postgres>::new(format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE TRUE"
        ));

        for qb in [&mut count, &mut query] {
            if let Some(status) = status {
                qb.push(" AND status = ").push_bind(status);
            }
        }

        let total: i64 = count.build_query_scalar().fetch_one(self.pool).await?;

        query.push(" ORDER BY created_at DESC LIMIT ");
        query.push_bind(page.limit());
        query.push(" OFFSET ");
        query.push_bind(page.offset());

        let reviews = query
            .build_query_as::<Review>()
            .fetch_all(self.pool)
            .await?;

        Ok(Paginated::new(reviews, total, page))
    }

    /// Moderate a review.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the review doesn't exist.
    pub async fn set_status(
        &self,
        id: ReviewId,
        status: ReviewStatus,
    ) -> Result<Review, RepositoryError> {
        sqlx::query_as::<_, Review>(&format!(
            "UPDATE reviews SET status = $1, updated_at = now()
             WHERE id = $2
             RETURNING {REVIEW_COLUMNS}"
        ))
        .bind(status)
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }
}
