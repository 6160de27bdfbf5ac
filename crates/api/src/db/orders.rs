//! Order repository.
//!
//! Checkout snapshots the priced cart into an order inside one transaction:
//! coupon claim, coin spend, order + item inserts and the cart clear either
//! all commit or none do. Status changes go through `transition`, which
//! locks the row, reads the *persisted* status and asks the state-machine
//! guard before writing - callers cannot skip states.

use sqlx::{PgPool, Postgres, QueryBuilder};

use attara_core::{
    AddressId, CoinSource, CoinTransactionType, CouponId, OrderId, OrderStatus, PageParams,
    Paginated, PaymentMethod, PaymentStatus, ProductId, UserId, VariantId, VendorId,
};
use rust_decimal::Decimal;

use super::RepositoryError;
use super::wallets::apply_coin_change;
use crate::models::order::{Order, OrderItem, OrderView};
use crate::services::pricing::CheckoutTotals;

const ORDER_COLUMNS: &str = "id, order_number, user_id, address_id, status, payment_method, \
     payment_status, subtotal, shipping_fee, gift_wrapping_fee, discount, tax, total, \
     coins_used, coins_earned, coupon_id, tracking_number, created_at, updated_at";

const ITEM_COLUMNS: &str = "id, order_id, product_id, variant_id, vendor_id, product_name, \
     variant_name, unit_price, quantity";

/// One line of the checkout snapshot, priced by the pricing service.
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub variant_id: Option<VariantId>,
    pub vendor_id: VendorId,
    pub product_name: String,
    pub variant_name: Option<String>,
    pub unit_price: Decimal,
    pub quantity: i32,
}

/// Everything `create_checkout` writes, computed up front by the caller.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_number: String,
    pub user_id: UserId,
    pub address_id: AddressId,
    pub payment_method: PaymentMethod,
    pub coupon_id: Option<CouponId>,
    pub totals: CheckoutTotals,
    pub items: Vec<NewOrderItem>,
}

/// Typed filter for admin order listings.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub user_id: Option<UserId>,
}

/// Repository for orders.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create the checkout snapshot.
    ///
    /// In one transaction: verify address ownership, claim the coupon usage
    /// slot (conditional update - `used_count` can never pass
    /// `usage_limit`), spend coins through the ledger, insert the order and
    /// its items with copied prices, and clear the cart.
    ///
    /// # Errors
    ///
    /// - `NotFound` / `Invalid` for a missing or foreign address.
    /// - `Conflict` if the coupon can no longer be claimed.
    /// - `InsufficientBalance` if the wallet can't cover `coins_used`.
    pub async fn create_checkout(&self, new_order: NewOrder) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let owner: UserId = sqlx::query_scalar("SELECT user_id FROM addresses WHERE id = $1")
            .bind(new_order.address_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        if owner != new_order.user_id {
            return Err(RepositoryError::Invalid(
                "address does not belong to user".to_owned(),
            ));
        }

        if let Some(coupon_id) = new_order.coupon_id {
            let claimed = sqlx::query(
                "UPDATE coupons SET used_count = used_count + 1
                 WHERE id = $1 AND is_active AND used_count < usage_limit
                   AND (expires_at IS NULL OR expires_at > now())
                   AND (user_id IS NULL OR user_id = $2)",
            )
            .bind(coupon_id)
            .bind(new_order.user_id)
            .execute(&mut *tx)
            .await?;
            if claimed.rows_affected() == 0 {
                return Err(RepositoryError::Conflict(
                    "coupon is no longer valid".to_owned(),
                ));
            }
        }

        let totals = &new_order.totals;
        if totals.coins_used > 0 {
            apply_coin_change(
                &mut tx,
                new_order.user_id,
                CoinTransactionType::Spent,
                CoinSource::Checkout,
                -totals.coins_used,
                None,
            )
            .await?;
        }

        let order = sqlx::query_as::<_, Order>(&format!(
            "INSERT INTO orders
                 (order_number, user_id, address_id, payment_method, payment_status,
                  subtotal, shipping_fee, gift_wrapping_fee, discount, tax, total,
                  coins_used, coins_earned, coupon_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(&new_order.order_number)
        .bind(new_order.user_id)
        .bind(new_order.address_id)
        .bind(new_order.payment_method)
        // Card is modeled as settled at checkout; COD settles on delivery.
        .bind(match new_order.payment_method {
            PaymentMethod::Card => PaymentStatus::Paid,
            PaymentMethod::Cod => PaymentStatus::Pending,
        })
        .bind(totals.subtotal)
        .bind(totals.shipping_fee)
        .bind(totals.gift_wrapping_fee)
        .bind(totals.discount)
        .bind(totals.tax)
        .bind(totals.total)
        .bind(totals.coins_used)
        .bind(totals.coins_earned)
        .bind(new_order.coupon_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "order number already exists"))?;

        for item in &new_order.items {
            sqlx::query(
                "INSERT INTO order_items
                     (order_id, product_id, variant_id, vendor_id, product_name,
                      variant_name, unit_price, quantity)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
            )
            .bind(order.id)
            .bind(item.product_id)
            .bind(item.variant_id)
            .bind(item.vendor_id)
            .bind(&item.product_name)
            .bind(&item.variant_name)
            .bind(item.unit_price)
            .bind(item.quantity)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query(
            "DELETE FROM cart_items ci USING carts c
             WHERE ci.cart_id = c.id AND c.user_id = $1",
        )
        .bind(new_order.user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(order)
    }

    /// Fetch an order by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(order)
    }

    /// Fetch an order with its items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_view(&self, id: OrderId) -> Result<Option<OrderView>, RepositoryError> {
        let Some(order) = self.get(id).await? else {
            return Ok(None);
        };
        let items = self.items(id).await?;
        Ok(Some(OrderView { order, items }))
    }

    /// Items of an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items(&self, id: OrderId) -> Result<Vec<OrderItem>, RepositoryError> {
        let items = sqlx::query_as::<_, OrderItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = $1 ORDER BY id ASC"
        ))
        .bind(id)
        .fetch_all(self.pool)
        .await?;
        Ok(items)
    }

    /// A user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_for_user(
        &self,
        user_id: UserId,
        page: PageParams,
    ) -> Result<Paginated<Order>, RepositoryError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(self.pool)
            .await?;

        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1
             ORDER BY created_at DESC LIMIT $2 OFFSET $3"
        ))
        .bind(user_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.pool)
        .await?;

        Ok(Paginated::new(orders, total, page))
    }

    /// Orders containing at least one item from the vendor, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_for_vendor(
        &self,
        vendor_id: VendorId,
        page: PageParams,
    ) -> Result<Paginated<Order>, RepositoryError> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(DISTINCT o.id) FROM orders o
             JOIN order_items oi ON oi.order_id = o.id
             WHERE oi.vendor_id = $1",
        )
        .bind(vendor_id)
        .fetch_one(self.pool)
        .await?;

        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT DISTINCT ON (o.created_at, o.id) {}
             FROM orders o
             JOIN order_items oi ON oi.order_id = o.id
             WHERE oi.vendor_id = $1
             ORDER BY o.created_at DESC, o.id DESC
             LIMIT $2 OFFSET $3",
            qualified_order_columns()
        ))
        .bind(vendor_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.pool)
        .await?;

        Ok(Paginated::new(orders, total, page))
    }

    /// Paginated admin listing with a typed filter.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        filter: &OrderFilter,
        page: PageParams,
    ) -> Result<Paginated<Order>, RepositoryError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM orders WHERE TRUE");
        let mut query = QueryBuilder::<Postgres>::new(format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE TRUE"
        ));

        for qb in [&mut count, &mut query] {
            if let Some(status) = filter.status {
                qb.push(" AND status = ").push_bind(status);
            }
            if let Some(payment_status) = filter.payment_status {
                qb.push(" AND payment_status = ").push_bind(payment_status);
            }
            if let Some(user_id) = filter.user_id {
                qb.push(" AND user_id = ").push_bind(user_id);
            }
        }

        let total: i64 = count.build_query_scalar().fetch_one(self.pool).await?;

        query.push(" ORDER BY created_at DESC LIMIT ");
        query.push_bind(page.limit());
        query.push(" OFFSET ");
        query.push_bind(page.offset());

        let orders = query
            .build_query_as::<Order>()
            .fetch_all(self.pool)
            .await?;

        Ok(Paginated::new(orders, total, page))
    }

    /// Apply a guarded status transition.
    ///
    /// Locks the order row, validates `next` against the persisted status,
    /// and applies the side effects of the target state: a tracking number
    /// is required (and only accepted) when entering `shipped`; entering
    /// `delivered` settles COD payment and credits `coins_earned` to the
    /// customer's wallet; entering `cancelled` refunds any coins spent at
    /// checkout. All writes share the transaction.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the order doesn't exist.
    /// - `IllegalTransition` if the guard rejects the jump.
    /// - `Invalid` if a tracking number is missing/unexpected.
    pub async fn transition(
        &self,
        id: OrderId,
        next: OrderStatus,
        tracking_number: Option<String>,
    ) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        if !current.status.can_transition_to(next) {
            return Err(RepositoryError::IllegalTransition(format!(
                "cannot move order from {} to {next}",
                current.status
            )));
        }

        if next == OrderStatus::Shipped {
            if tracking_number.is_none() {
                return Err(RepositoryError::Invalid(
                    "tracking number is required when shipping".to_owned(),
                ));
            }
        } else if tracking_number.is_some() {
            return Err(RepositoryError::Invalid(
                "tracking number is only accepted when shipping".to_owned(),
            ));
        }

        let settle_cod =
            next == OrderStatus::Delivered && current.payment_method == PaymentMethod::Cod;

        let order = sqlx::query_as::<_, Order>(&format!(
            "UPDATE orders SET
                 status = $1,
                 tracking_number = COALESCE($2, tracking_number),
                 payment_status = CASE WHEN $3 THEN 'paid'::payment_status ELSE payment_status END,
                 updated_at = now()
             WHERE id = $4
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(next)
        .bind(&tracking_number)
        .bind(settle_cod)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        if next == OrderStatus::Delivered && order.coins_earned > 0 {
            apply_coin_change(
                &mut tx,
                order.user_id,
                CoinTransactionType::Earned,
                CoinSource::OrderDelivered,
                order.coins_earned,
                Some(order.id),
            )
            .await?;
        }

        if next == OrderStatus::Cancelled && order.coins_used > 0 {
            apply_coin_change(
                &mut tx,
                order.user_id,
                CoinTransactionType::Refunded,
                CoinSource::Adjustment,
                order.coins_used,
                Some(order.id),
            )
            .await?;
        }

        tx.commit().await?;
        Ok(order)
    }

    /// Customer-initiated cancellation, legal only while pending. Coins
    /// spent at checkout are returned as a `refunded` ledger entry.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the order doesn't exist for this user.
    /// - `IllegalTransition` if the order has left `pending`.
    pub async fn cancel_own(&self, id: OrderId, user_id: UserId) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1 AND user_id = $2 FOR UPDATE"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        if !current.status.can_transition_to(OrderStatus::Cancelled) {
            return Err(RepositoryError::IllegalTransition(format!(
                "cannot cancel an order that is {}",
                current.status
            )));
        }

        let order = sqlx::query_as::<_, Order>(&format!(
            "UPDATE orders SET status = 'cancelled', updated_at = now()
             WHERE id = $1
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        if order.coins_used > 0 {
            apply_coin_change(
                &mut tx,
                user_id,
                CoinTransactionType::Refunded,
                CoinSource::Adjustment,
                order.coins_used,
                Some(order.id),
            )
            .await?;
        }

        tx.commit().await?;
        Ok(order)
    }
}

/// `ORDER_COLUMNS` qualified with the `o.` alias for joined queries.
fn qualified_order_columns() -> String {
    ORDER_COLUMNS
        .split(", ")
        .map(|col| format!("o.{}", col.trim()))
        .collect::<Vec<_>>()
        .join(", ")
}
