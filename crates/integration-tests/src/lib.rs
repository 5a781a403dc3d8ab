//! Shared helpers for the Toy Trove integration suite.
//!
//! Every test here needs a real `PostgreSQL` instance. Point
//! `TOYTROVE_TEST_DATABASE_URL` (or `DATABASE_URL`) at a scratch database and
//! run with `cargo test -p toy-trove-integration-tests -- --ignored`.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::unwrap_used, clippy::expect_used)]

use rust_decimal::Decimal;
use secrecy::SecretString;
use sqlx::PgPool;

use toy_trove_core::UserId;
use toy_trove_engine::catalog;
use toy_trove_engine::models::Product;
use toy_trove_engine::requests::NewProduct;

/// Connect to the test database and ensure the schema is current.
///
/// # Panics
///
/// Panics if no database URL is configured or the connection fails; these
/// tests are `#[ignore]`d precisely so that is an explicit opt-in.
pub async fn test_pool() -> PgPool {
    let url = std::env::var("TOYTROVE_TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .expect("TOYTROVE_TEST_DATABASE_URL not set");

    let pool = toy_trove_engine::create_pool(&url)
        .await
        .expect("failed to connect to test database");

    toy_trove_engine::MIGRATOR
        .run(&pool)
        .await
        .expect("failed to run migrations");

    pool
}

/// Create a throwaway product with the given price (in cents) and stock.
pub async fn create_test_product(pool: &PgPool, price_cents: i64, stock: i32) -> Product {
    catalog::create_product(
        pool,
        NewProduct {
            name: format!("test-product-{}", rand::random::<u32>()),
            price: Decimal::new(price_cents, 2),
            initial_stock: stock,
        },
    )
    .await
    .expect("failed to create test product")
}

/// A random user ID, so concurrent test runs don't trample each other's
/// carts and orders.
#[must_use]
pub fn test_user() -> UserId {
    UserId::new(i32::from(rand::random::<u16>()) + 100_000)
}

/// Base URL for the running API (HTTP-level tests only).
#[must_use]
pub fn api_base_url() -> String {
    std::env::var("TOYTROVE_API_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}
