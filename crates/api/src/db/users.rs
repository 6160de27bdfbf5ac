//! User repository.

use sqlx::{PgConnection, PgPool};

use attara_core::{Email, PageParams, Paginated, UserId, UserRole};

use super::RepositoryError;
use crate::models::User;

const USER_COLUMNS: &str =
    "id, email, password_hash, full_name, role, is_active, created_at, updated_at";

/// Typed filter for admin user listings.
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
    /// Substring match on email or full name.
    pub search: Option<String>,
}

/// Repository for user accounts.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a user and their wallet in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    pub async fn create(
        &self,
        email: &Email,
        password_hash: &str,
        full_name: &str,
    ) -> Result<User, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, password_hash, full_name)
             VALUES ($1, $2, $3)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(email)
        .bind(password_hash)
        .bind(full_name)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "email already exists"))?;

        sqlx::query("INSERT INTO wallets (user_id) VALUES ($1)")
            .bind(user.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(user)
    }

    /// Look up a user by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(self.pool)
        .await?;
        Ok(user)
    }

    /// Look up a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(user)
    }

    /// Flip a user's active flag (admin moderation).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn set_active(&self, id: UserId, is_active: bool) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE users SET is_active = $1, updated_at = now() WHERE id = $2",
        )
        .bind(is_active)
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Paginated admin listing with a typed filter.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        filter: &UserFilter,
        page: PageParams,
    ) -> Result<Paginated<User>, RepositoryError> {
        let mut count = sqlx::QueryBuilder::new("SELECT COUNT(*) FROM users WHERE TRUE");
        let mut query = sqlx::QueryBuilder::new(format!(
            "SELECT {USER_COLUMNS} FROM users WHERE TRUE"
        ));

        for qb in [&mut count, &mut query] {
            if let Some(role) = filter.role {
                qb.push(" AND role = ").push_bind(role);
            }
            if let Some(is_active) = filter.is_active {
                qb.push(" AND is_active = ").push_bind(is_active);
            }
            if let Some(search) = &filter.search {
                let pattern = format!("%{search}%");
                qb.push(" AND (email ILIKE ").push_bind(pattern.clone());
                qb.push(" OR full_name ILIKE ").push_bind(pattern);
                qb.push(")");
            }
        }

        let total: i64 = count.build_query_scalar().fetch_one(self.pool).await?;

        query.push(" ORDER BY created_at DESC LIMIT ");
        query.push_bind(page.limit());
        query.push(" OFFSET ");
        query.push_bind(page.offset());

        let users = query
            .build_query_as::<User>()
            .fetch_all(self.pool)
            .await?;

        Ok(Paginated::new(users, total, page))
    }
}

/// Flip a user's role inside the caller's transaction.
///
/// Used by vendor approval so the role change commits or rolls back with
/// the rest of the moderation write.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the user doesn't exist.
pub(crate) async fn set_role(
    conn: &mut PgConnection,
    id: UserId,
    role: UserRole,
) -> Result<(), RepositoryError> {
    let result = sqlx::query("UPDATE users SET role = $1, updated_at = now() WHERE id = $2")
        .bind(role)
        .bind(id)
        .execute(conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }
    Ok(())
}
