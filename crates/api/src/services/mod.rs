//! Domain services.
//!
//! Pure computation lives here (pricing, invoice rendering) alongside the
//! auth service (password hashing, JWT mint/verify). Repositories call into
//! these; the services never touch the database themselves.

pub mod auth;
pub mod codes;
pub mod invoice;
pub mod pricing;
