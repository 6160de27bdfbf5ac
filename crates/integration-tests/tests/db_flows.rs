//! Repository flows against a real database.
//!
//! These tests need a reachable Postgres via `API_DATABASE_URL` or
//! `DATABASE_URL`; without one they return early. Fixtures are inserted
//! with raw SQL so only the operation under test goes through the
//! repository layer.

use rust_decimal::Decimal;
use sqlx::PgPool;

use attara_core::{
    AddressId, CategoryId, DiscountKind, OrderStatus, PaymentMethod, PaymentStatus, ProductId,
    UserId, VendorId,
};

use attara_api::db::addresses::AddressFields;
use attara_api::db::coupons::{CouponChanges, CouponFields};
use attara_api::db::orders::{NewOrder, NewOrderItem};
use attara_api::db::products::VariantFields;
use attara_api::db::{
    AddressRepository, CartRepository, CouponRepository, OrderRepository, ProductRepository,
    RepositoryError, WalletRepository,
};
use attara_api::services::codes::generate_order_number;
use attara_api::services::pricing::{CheckoutOptions, price_checkout};
use attara_integration_tests::{db_pool, unique};

async fn seed_customer(pool: &PgPool) -> UserId {
    let id: i32 = sqlx::query_scalar(
        "INSERT INTO users (email, password_hash, full_name)
         VALUES ($1 || '@example.com', '!', 'Test Shopper')
         RETURNING id",
    )
    .bind(unique("shopper"))
    .fetch_one(pool)
    .await
    .expect("seed user");

    sqlx::query("INSERT INTO wallets (user_id) VALUES ($1)")
        .bind(id)
        .execute(pool)
        .await
        .expect("seed wallet");

    UserId::new(id)
}

async fn seed_vendor(pool: &PgPool) -> VendorId {
    let user_id: i32 = sqlx::query_scalar(
        "INSERT INTO users (email, password_hash, full_name, role)
         VALUES ($1 || '@example.com', '!', 'Test Vendor', 'vendor')
         RETURNING id",
    )
    .bind(unique("vendor"))
    .fetch_one(pool)
    .await
    .expect("seed vendor user");

    sqlx::query("INSERT INTO wallets (user_id) VALUES ($1)")
        .bind(user_id)
        .execute(pool)
        .await
        .expect("seed vendor wallet");

    let id: i32 = sqlx::query_scalar(
        "INSERT INTO vendors (user_id, store_name, status)
         VALUES ($1, $2, 'approved')
         RETURNING id",
    )
    .bind(user_id)
    .bind(unique("store"))
    .fetch_one(pool)
    .await
    .expect("seed vendor");

    VendorId::new(id)
}

async fn seed_category(pool: &PgPool) -> CategoryId {
    let id: i32 = sqlx::query_scalar(
        "INSERT INTO categories (name, slug) VALUES ('Eau de Parfum', $1) RETURNING id",
    )
    .bind(unique("edp"))
    .fetch_one(pool)
    .await
    .expect("seed category");
    CategoryId::new(id)
}

async fn seed_product(
    pool: &PgPool,
    vendor_id: VendorId,
    category_id: CategoryId,
    price: i64,
) -> ProductId {
    let id: i32 = sqlx::query_scalar(
        "INSERT INTO products (vendor_id, category_id, name, price, stock)
         VALUES ($1, $2, $3, $4, 50)
         RETURNING id",
    )
    .bind(vendor_id)
    .bind(category_id)
    .bind(unique("Oud Royale"))
    .bind(Decimal::from(price))
    .fetch_one(pool)
    .await
    .expect("seed product");
    ProductId::new(id)
}

async fn seed_address(pool: &PgPool, user_id: UserId) -> AddressId {
    let address = AddressRepository::new(pool)
        .create(user_id, &address_fields(false))
        .await
        .expect("seed address");
    address.id
}

fn address_fields(is_default: bool) -> AddressFields {
    AddressFields {
        full_name: "Amina K".to_owned(),
        phone: "+971500000000".to_owned(),
        line1: "1 Marina Walk".to_owned(),
        line2: None,
        city: "Dubai".to_owned(),
        state: "Dubai".to_owned(),
        country: "AE".to_owned(),
        zip_code: "00000".to_owned(),
        is_default,
    }
}

/// Checkout through the repositories: cart, pricing, snapshot.
async fn place_order(pool: &PgPool, user_id: UserId, product_id: ProductId, quantity: i32) -> attara_api::models::Order {
    let address_id = seed_address(pool, user_id).await;

    let carts = CartRepository::new(pool);
    let cart = carts.get_or_create(user_id).await.expect("cart");
    carts
        .add_item(cart.id, product_id, None, quantity)
        .await
        .expect("add item");

    let now = chrono::Utc::now();
    let items = carts.priced_items(cart.id).await.expect("priced items");
    let (lines, totals) =
        price_checkout(&items, &CheckoutOptions::default(), now).expect("pricing");

    let order_items = items
        .iter()
        .zip(&lines)
        .map(|(item, line)| NewOrderItem {
            product_id: item.product_id,
            variant_id: item.variant_id,
            vendor_id: item.vendor_id,
            product_name: item.product_name.clone(),
            variant_name: item.variant_name.clone(),
            unit_price: line.unit_price,
            quantity: item.quantity,
        })
        .collect();

    OrderRepository::new(pool)
        .create_checkout(NewOrder {
            order_number: generate_order_number(now),
            user_id,
            address_id,
            payment_method: PaymentMethod::Card,
            coupon_id: None,
            totals,
            items: order_items,
        })
        .await
        .expect("checkout")
}

#[tokio::test]
async fn vendor_can_add_a_variant_to_an_owned_product() {
    let Some(pool) = db_pool().await else { return };

    let vendor_id = seed_vendor(&pool).await;
    let category_id = seed_category(&pool).await;
    let product_id = seed_product(&pool, vendor_id, category_id, 120).await;

    let repo = ProductRepository::new(&pool);
    let fields = VariantFields {
        name: "100ml".to_owned(),
        price: Some(Decimal::from(150)),
        stock: 10,
    };

    let variant = repo
        .add_variant(product_id, vendor_id, &fields)
        .await
        .expect("variant created");
    assert_eq!(variant.product_id, product_id);
    assert_eq!(variant.name, "100ml");
    assert_eq!(variant.price, Some(Decimal::from(150)));
}

#[tokio::test]
async fn variant_on_a_foreign_product_is_not_found() {
    let Some(pool) = db_pool().await else { return };

    let owner = seed_vendor(&pool).await;
    let intruder = seed_vendor(&pool).await;
    let category_id = seed_category(&pool).await;
    let product_id = seed_product(&pool, owner, category_id, 120).await;

    let fields = VariantFields {
        name: "50ml".to_owned(),
        price: None,
        stock: 5,
    };
    let err = ProductRepository::new(&pool)
        .add_variant(product_id, intruder, &fields)
        .await
        .expect_err("foreign product");
    assert!(matches!(err, RepositoryError::NotFound));
}

#[tokio::test]
async fn checkout_snapshots_the_cart_and_clears_it() {
    let Some(pool) = db_pool().await else { return };

    let user_id = seed_customer(&pool).await;
    let vendor_id = seed_vendor(&pool).await;
    let category_id = seed_category(&pool).await;
    let product_id = seed_product(&pool, vendor_id, category_id, 100).await;

    let order = place_order(&pool, user_id, product_id, 2).await;

    // subtotal 200, tax 10, shipping 25 (threshold is strict)
    assert_eq!(order.subtotal, Decimal::from(200));
    assert_eq!(order.tax, Decimal::from(10));
    assert_eq!(order.shipping_fee, Decimal::from(25));
    assert_eq!(order.total, Decimal::from(235));
    assert_eq!(order.coins_earned, 23);
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.payment_status, PaymentStatus::Paid);

    let items = OrderRepository::new(&pool)
        .items(order.id)
        .await
        .expect("order items");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity, 2);
    assert_eq!(items[0].unit_price, Decimal::from(100));

    let carts = CartRepository::new(&pool);
    let cart = carts.get_or_create(user_id).await.expect("cart");
    assert!(carts.priced_items(cart.id).await.expect("items").is_empty());
}

#[tokio::test]
async fn order_transitions_follow_the_guard() {
    let Some(pool) = db_pool().await else { return };

    let user_id = seed_customer(&pool).await;
    let vendor_id = seed_vendor(&pool).await;
    let category_id = seed_category(&pool).await;
    let product_id = seed_product(&pool, vendor_id, category_id, 100).await;
    let order = place_order(&pool, user_id, product_id, 1).await;

    let repo = OrderRepository::new(&pool);

    let err = repo
        .transition(order.id, OrderStatus::Delivered, None)
        .await
        .expect_err("pending cannot jump to delivered");
    assert!(matches!(err, RepositoryError::IllegalTransition(_)));

    repo.transition(order.id, OrderStatus::Confirmed, None)
        .await
        .expect("confirm");
    repo.transition(order.id, OrderStatus::Processing, None)
        .await
        .expect("process");

    let err = repo
        .transition(order.id, OrderStatus::Shipped, None)
        .await
        .expect_err("shipping needs a tracking number");
    assert!(matches!(err, RepositoryError::Invalid(_)));

    let shipped = repo
        .transition(order.id, OrderStatus::Shipped, Some("TRK-1".to_owned()))
        .await
        .expect("ship");
    assert_eq!(shipped.tracking_number.as_deref(), Some("TRK-1"));

    let before = WalletRepository::new(&pool)
        .get_by_user(user_id)
        .await
        .expect("wallet")
        .balance;

    let delivered = repo
        .transition(order.id, OrderStatus::Delivered, None)
        .await
        .expect("deliver");
    assert_eq!(delivered.status, OrderStatus::Delivered);

    let after = WalletRepository::new(&pool)
        .get_by_user(user_id)
        .await
        .expect("wallet")
        .balance;
    assert_eq!(after, before + delivered.coins_earned);
}

#[tokio::test]
async fn usage_limit_cannot_drop_below_the_claimed_count() {
    let Some(pool) = db_pool().await else { return };

    let vendor_id = seed_vendor(&pool).await;
    let repo = CouponRepository::new(&pool);

    let coupon = repo
        .create(
            vendor_id,
            &CouponFields {
                code: unique("save"),
                kind: DiscountKind::Fixed,
                value: Decimal::from(20),
                min_order_amount: Decimal::ZERO,
                usage_limit: 10,
                expires_at: None,
            },
        )
        .await
        .expect("create coupon");

    sqlx::query("UPDATE coupons SET used_count = 3 WHERE id = $1")
        .bind(coupon.id)
        .execute(&pool)
        .await
        .expect("claim usages");

    let err = repo
        .update_limits(
            coupon.id,
            vendor_id,
            &CouponChanges {
                usage_limit: Some(1),
                ..CouponChanges::default()
            },
        )
        .await
        .expect_err("limit below claimed count");
    assert!(matches!(err, RepositoryError::Invalid(_)));

    let raised = repo
        .update_limits(
            coupon.id,
            vendor_id,
            &CouponChanges {
                usage_limit: Some(20),
                ..CouponChanges::default()
            },
        )
        .await
        .expect("raise limit");
    assert_eq!(raised.usage_limit, 20);

    let other_vendor = seed_vendor(&pool).await;
    let err = repo
        .update_limits(coupon.id, other_vendor, &CouponChanges::default())
        .await
        .expect_err("foreign coupon");
    assert!(matches!(err, RepositoryError::NotFound));
}

#[tokio::test]
async fn one_default_address_survives_create_and_delete() {
    let Some(pool) = db_pool().await else { return };

    let user_id = seed_customer(&pool).await;
    let repo = AddressRepository::new(&pool);

    let first = repo
        .create(user_id, &address_fields(false))
        .await
        .expect("first address");
    assert!(first.is_default, "first address is forced default");

    let second = repo
        .create(user_id, &address_fields(true))
        .await
        .expect("second address");
    assert!(second.is_default);

    let listed = repo.list_for_user(user_id).await.expect("list");
    let defaults: Vec<_> = listed.iter().filter(|a| a.is_default).collect();
    assert_eq!(defaults.len(), 1);
    assert_eq!(defaults[0].id, second.id);

    repo.delete(second.id, user_id).await.expect("delete default");

    let listed = repo.list_for_user(user_id).await.expect("list");
    assert_eq!(listed.len(), 1);
    assert!(listed[0].is_default, "oldest remaining address is promoted");
    assert_eq!(listed[0].id, first.id);
}
