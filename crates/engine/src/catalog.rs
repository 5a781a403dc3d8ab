//! Minimal product surface: what checkout, seeding, and the admin
//! adjustment path need. Full catalog management (descriptions, images,
//! categories) lives outside this engine.

use sqlx::PgPool;
use toy_trove_core::{MovementReason, ProductId};

use crate::error::EngineError;
use crate::ledger;
use crate::models::Product;
use crate::requests::NewProduct;

/// Insert a product and record its initial stock as a `restock` movement,
/// in one transaction, so ledger replay holds from the first row.
///
/// # Errors
///
/// `Validation` for a non-positive price or negative initial stock.
pub async fn create_product(pool: &PgPool, new: NewProduct) -> Result<Product, EngineError> {
    if new.price <= rust_decimal::Decimal::ZERO {
        return Err(EngineError::Validation("price must be positive".to_string()));
    }
    if new.initial_stock < 0 {
        return Err(EngineError::Validation(
            "initial stock must not be negative".to_string(),
        ));
    }

    let mut tx = pool.begin().await?;

    let product = sqlx::query_as::<_, Product>(
        r"
        INSERT INTO products (name, price, stock, is_active)
        VALUES ($1, $2, 0, TRUE)
        RETURNING id, name, price, stock, is_active, created_at, updated_at
        ",
    )
    .bind(&new.name)
    .bind(new.price)
    .fetch_one(&mut *tx)
    .await?;

    let product = if new.initial_stock > 0 {
        let stock = ledger::adjust(
            &mut tx,
            product.id,
            new.initial_stock,
            MovementReason::Restock,
            Some("initial stock"),
        )
        .await?;
        Product { stock, ..product }
    } else {
        product
    };

    tx.commit().await?;

    tracing::info!(product_id = %product.id, name = %product.name, "product created");
    Ok(product)
}

/// Fetch a product by ID.
///
/// # Errors
///
/// Returns `EngineError::Database` if the query fails.
pub async fn get(pool: &PgPool, product_id: ProductId) -> Result<Option<Product>, EngineError> {
    let product = sqlx::query_as::<_, Product>(
        r"
        SELECT id, name, price, stock, is_active, created_at, updated_at
        FROM products
        WHERE id = $1
        ",
    )
    .bind(product_id)
    .fetch_optional(pool)
    .await?;

    Ok(product)
}

/// List active products, name order.
///
/// # Errors
///
/// Returns `EngineError::Database` if the query fails.
pub async fn list_active(pool: &PgPool, limit: i64) -> Result<Vec<Product>, EngineError> {
    let products = sqlx::query_as::<_, Product>(
        r"
        SELECT id, name, price, stock, is_active, created_at, updated_at
        FROM products
        WHERE is_active
        ORDER BY name
        LIMIT $1
        ",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(products)
}
