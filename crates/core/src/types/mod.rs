//! Core types for Attara.

pub mod email;
pub mod id;
pub mod money;
pub mod pagination;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use money::{
    COIN_VALUE_AED, MIN_COIN_REDEMPTION, coins_for_total, max_coins_redeemable, round_money,
};
pub use pagination::{PageMeta, PageParams, Paginated};
pub use status::*;
