//! Database-backed domain models.
//!
//! Each struct maps 1:1 to a table row via `sqlx::FromRow`. Computed views
//! (priced carts, order graphs) live next to the row types they are built
//! from.

pub mod address;
pub mod cart;
pub mod category;
pub mod coupon;
pub mod order;
pub mod product;
pub mod review;
pub mod user;
pub mod vendor;
pub mod wallet;

pub use address::Address;
pub use cart::{Cart, CartView, PricedCartItem};
pub use category::Category;
pub use coupon::Coupon;
pub use order::{Order, OrderItem, OrderView};
pub use product::{Product, ProductVariant};
pub use review::Review;
pub use user::User;
pub use vendor::Vendor;
pub use wallet::{CoinTransaction, Wallet};
