//! Toy Trove Core - Shared types library.
//!
//! This crate provides common types used across all Toy Trove components:
//! - `engine` - Order & inventory consistency engine
//! - `api` - HTTP surface for shoppers, admins, and payment callbacks
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere. In
//! particular the order status graph lives here so the state machine can be
//! exercised without a database.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and the domain enums

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
