//! Request extractors for authentication and role checks.

pub mod auth;

pub use auth::{CurrentUser, RequireAdmin, RequireVendor};
