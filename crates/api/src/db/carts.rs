//! Cart repository.
//!
//! The cart is a singleton per user, created lazily on first access. Items
//! carry no prices; the priced view joins the live catalog rows so price
//! changes show up in an unpurchased cart immediately.

use sqlx::PgPool;

use attara_core::{CartId, CartItemId, ProductId, UserId, VariantId};

use super::RepositoryError;
use crate::models::cart::{Cart, PricedCartItem};

/// Join producing everything the pricing service needs per line.
const PRICED_ITEMS_SQL: &str = "SELECT ci.id, ci.product_id, ci.variant_id, p.vendor_id,
            p.name AS product_name, v.name AS variant_name, ci.quantity,
            p.price AS product_price, v.price AS variant_price,
            p.flash_sale_percent, p.flash_sale_ends_at
     FROM cart_items ci
     JOIN products p ON p.id = ci.product_id
     LEFT JOIN product_variants v ON v.id = ci.variant_id
     WHERE ci.cart_id = $1
     ORDER BY ci.created_at ASC, ci.id ASC";

/// Repository for carts and cart items.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Fetch the user's cart, creating it on first access.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_or_create(&self, user_id: UserId) -> Result<Cart, RepositoryError> {
        let cart = sqlx::query_as::<_, Cart>(
            "INSERT INTO carts (user_id) VALUES ($1)
             ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
             RETURNING id, user_id, created_at, updated_at",
        )
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;
        Ok(cart)
    }

    /// Cart items joined against live product/variant rows.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn priced_items(
        &self,
        cart_id: CartId,
    ) -> Result<Vec<PricedCartItem>, RepositoryError> {
        let items = sqlx::query_as::<_, PricedCartItem>(PRICED_ITEMS_SQL)
            .bind(cart_id)
            .fetch_all(self.pool)
            .await?;
        Ok(items)
    }

    /// Add an item to the cart, merging quantity into an existing
    /// `(product, variant)` line.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the product (or variant) doesn't exist.
    /// - `Invalid` if the product/variant is inactive or the variant does
    ///   not belong to the product.
    pub async fn add_item(
        &self,
        cart_id: CartId,
        product_id: ProductId,
        variant_id: Option<VariantId>,
        quantity: i32,
    ) -> Result<(), RepositoryError> {
        if quantity < 1 {
            return Err(RepositoryError::Invalid(
                "quantity must be at least 1".to_owned(),
            ));
        }

        let product_active: bool =
            sqlx::query_scalar("SELECT is_active FROM products WHERE id = $1")
                .bind(product_id)
                .fetch_optional(self.pool)
                .await?
                .ok_or(RepositoryError::NotFound)?;
        if !product_active {
            return Err(RepositoryError::Invalid(
                "product is not available".to_owned(),
            ));
        }

        if let Some(variant_id) = variant_id {
            let row: (ProductId, bool) = sqlx::query_as(
                "SELECT product_id, is_active FROM product_variants WHERE id = $1",
            )
            .bind(variant_id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;

            if row.0 != product_id {
                return Err(RepositoryError::Invalid(
                    "variant does not belong to product".to_owned(),
                ));
            }
            if !row.1 {
                return Err(RepositoryError::Invalid(
                    "variant is not available".to_owned(),
                ));
            }
        }

        sqlx::query(
            "INSERT INTO cart_items (cart_id, product_id, variant_id, quantity)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (cart_id, product_id, variant_id)
             DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity",
        )
        .bind(cart_id)
        .bind(product_id)
        .bind(variant_id)
        .bind(quantity)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Change a line's quantity. Ownership is verified through the cart's
    /// user on the same statement.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line doesn't exist in this
    /// user's cart.
    pub async fn update_item(
        &self,
        item_id: CartItemId,
        user_id: UserId,
        quantity: i32,
    ) -> Result<(), RepositoryError> {
        if quantity < 1 {
            return Err(RepositoryError::Invalid(
                "quantity must be at least 1".to_owned(),
            ));
        }

        let result = sqlx::query(
            "UPDATE cart_items ci SET quantity = $1
             FROM carts c
             WHERE ci.id = $2 AND ci.cart_id = c.id AND c.user_id = $3",
        )
        .bind(quantity)
        .bind(item_id)
        .bind(user_id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Remove a line from the user's cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line doesn't exist in this
    /// user's cart.
    pub async fn remove_item(
        &self,
        item_id: CartItemId,
        user_id: UserId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "DELETE FROM cart_items ci
             USING carts c
             WHERE ci.id = $1 AND ci.cart_id = c.id AND c.user_id = $2",
        )
        .bind(item_id)
        .bind(user_id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Empty the user's cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear(&self, user_id: UserId) -> Result<(), RepositoryError> {
        sqlx::query(
            "DELETE FROM cart_items ci
             USING carts c
             WHERE ci.cart_id = c.id AND c.user_id = $1",
        )
        .bind(user_id)
        .execute(self.pool)
        .await?;
        Ok(())
    }
}
