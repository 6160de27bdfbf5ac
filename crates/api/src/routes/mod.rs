//! HTTP route handlers for the marketplace API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                      - Liveness check
//! GET  /health/ready                - Readiness check (database ping)
//!
//! # Auth
//! POST /auth/register               - Create account, set session cookie
//! POST /auth/login                  - Verify credentials, set session cookie
//! POST /auth/logout                 - Clear session cookie
//! GET  /auth/me                     - Authenticated user's profile
//!
//! # Addresses
//! GET    /addresses                 - List own addresses, default first
//! POST   /addresses                 - Create (first address forced default)
//! PATCH  /addresses/{id}            - Update
//! POST   /addresses/{id}/default    - Set default
//! DELETE /addresses/{id}            - Delete (promotes oldest on default)
//!
//! # Cart
//! GET    /cart                      - Priced cart (lazily created)
//! DELETE /cart                      - Empty the cart
//! POST   /cart/items                - Add item (merges quantity)
//! PATCH  /cart/items/{id}           - Change quantity
//! DELETE /cart/items/{id}           - Remove line
//!
//! # Orders
//! POST /orders/checkout             - Snapshot cart into an order
//! GET  /orders                      - Own orders (paginated)
//! GET  /orders/{id}                 - Own order with items
//! POST /orders/{id}/cancel          - Cancel while pending
//! GET  /orders/{id}/invoice         - Plain-text invoice
//!
//! # Wallet
//! GET  /wallet                      - Balance + recent ledger
//! GET  /wallet/transactions         - Paginated ledger
//! POST /wallet/redeem               - Coins -> single-use coupon
//!
//! # Catalog (public)
//! GET  /products                    - Active products, typed filters
//! GET  /products/{id}               - Detail with variants and reviews
//! POST /products/{id}/reviews       - Submit review (requires auth)
//! GET  /categories                  - Active category tree
//! GET  /categories/{id}             - Single category
//!
//! # Vendor (requires approved vendor, except apply/profile)
//! POST   /vendor/apply
//! GET    /vendor/profile
//! GET    /vendor/products           POST /vendor/products
//! PATCH  /vendor/products/{id}      DELETE /vendor/products/{id}
//! POST   /vendor/products/{id}/variants
//! DELETE /vendor/variants/{id}
//! POST   /vendor/products/{id}/flash-sale
//! DELETE /vendor/products/{id}/flash-sale
//! GET    /vendor/coupons            POST /vendor/coupons
//! PATCH  /vendor/coupons/{id}       DELETE /vendor/coupons/{id}
//! GET    /vendor/orders
//! POST   /vendor/orders/{id}/advance
//!
//! # Admin (requires admin role)
//! GET  /admin/users                 PATCH /admin/users/{id}
//! GET  /admin/vendors               POST  /admin/vendors/{id}/status
//! GET  /admin/products              PATCH /admin/products/{id}
//! POST /admin/categories
//! PATCH /admin/categories/{id}      DELETE /admin/categories/{id}
//! GET  /admin/reviews               POST  /admin/reviews/{id}/status
//! GET  /admin/orders                POST  /admin/orders/{id}/status
//! ```

pub mod addresses;
pub mod admin;
pub mod auth;
pub mod cart;
pub mod categories;
pub mod orders;
pub mod products;
pub mod vendor;
pub mod wallet;

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

/// Create the address routes router.
pub fn address_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(addresses::list).post(addresses::create))
        .route(
            "/{id}",
            axum::routing::patch(addresses::update).delete(addresses::delete),
        )
        .route("/{id}/default", post(addresses::set_default))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).delete(cart::clear))
        .route("/items", post(cart::add_item))
        .route(
            "/items/{id}",
            axum::routing::patch(cart::update_item).delete(cart::remove_item),
        )
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/checkout", post(orders::checkout))
        .route("/", get(orders::list))
        .route("/{id}", get(orders::get))
        .route("/{id}/cancel", post(orders::cancel))
        .route("/{id}/invoice", get(orders::invoice))
}

/// Create the wallet routes router.
pub fn wallet_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(wallet::show))
        .route("/transactions", get(wallet::transactions))
        .route("/redeem", post(wallet::redeem))
}

/// Create the public catalog routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
        .route("/{id}/reviews", post(products::create_review))
}

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::index))
        .route("/{id}", get(categories::show))
}

/// Create the vendor self-service routes router.
pub fn vendor_routes() -> Router<AppState> {
    Router::new()
        .route("/apply", post(vendor::apply))
        .route("/profile", get(vendor::profile))
        .route(
            "/products",
            get(vendor::list_products).post(vendor::create_product),
        )
        .route(
            "/products/{id}",
            axum::routing::patch(vendor::update_product).delete(vendor::delete_product),
        )
        .route("/products/{id}/variants", post(vendor::add_variant))
        .route("/variants/{id}", delete(vendor::remove_variant))
        .route(
            "/products/{id}/flash-sale",
            post(vendor::set_flash_sale).delete(vendor::clear_flash_sale),
        )
        .route(
            "/coupons",
            get(vendor::list_coupons).post(vendor::create_coupon),
        )
        .route(
            "/coupons/{id}",
            axum::routing::patch(vendor::update_coupon).delete(vendor::deactivate_coupon),
        )
        .route("/orders", get(vendor::list_orders))
        .route("/orders/{id}/advance", post(vendor::advance_order))
}

/// Create the admin moderation routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(admin::list_users))
        .route("/users/{id}", axum::routing::patch(admin::patch_user))
        .route("/vendors", get(admin::list_vendors))
        .route("/vendors/{id}/status", post(admin::set_vendor_status))
        .route("/products", get(admin::list_products))
        .route("/products/{id}", axum::routing::patch(admin::patch_product))
        .route("/categories", post(admin::create_category))
        .route(
            "/categories/{id}",
            axum::routing::patch(admin::update_category).delete(admin::delete_category),
        )
        .route("/reviews", get(admin::list_reviews))
        .route("/reviews/{id}/status", post(admin::set_review_status))
        .route("/orders", get(admin::list_orders))
        .route("/orders/{id}/status", post(admin::set_order_status))
}

/// Assemble all application routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/addresses", address_routes())
        .nest("/cart", cart_routes())
        .nest("/orders", order_routes())
        .nest("/wallet", wallet_routes())
        .nest("/products", product_routes())
        .nest("/categories", category_routes())
        .nest("/vendor", vendor_routes())
        .nest("/admin", admin_routes())
}
