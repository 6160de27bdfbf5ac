//! Attara Core - Shared domain types.
//!
//! This crate provides the common vocabulary used across the Attara
//! marketplace components:
//! - `api` - REST/JSON backend serving customers, vendors and admins
//! - `cli` - Command-line tools for migrations, seeding and management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! database access, no HTTP. This keeps it lightweight and allows it to be
//! used anywhere, including in tests.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, status enums with transition guards, email,
//!   money helpers and the pagination envelope.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
