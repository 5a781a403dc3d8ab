//! Inventory movement log: append-only stock delta records.
//!
//! Writers append inside the transaction that changes stock; readers serve
//! the admin reporting surface. No update or delete is exposed.

use sqlx::{PgPool, Postgres, Transaction};
use toy_trove_core::{MovementReason, ProductId};

use crate::error::EngineError;
use crate::models::Movement;
use crate::requests::Reconciliation;

/// Append one movement row. Only the ledger calls this.
pub(crate) async fn record(
    tx: &mut Transaction<'_, Postgres>,
    product_id: ProductId,
    delta: i32,
    reason: MovementReason,
    reference_id: Option<i64>,
    note: Option<&str>,
) -> Result<(), EngineError> {
    sqlx::query(
        r"
        INSERT INTO inventory_movements (product_id, delta, reason, reference_id, note)
        VALUES ($1, $2, $3, $4, $5)
        ",
    )
    .bind(product_id)
    .bind(delta)
    .bind(reason)
    .bind(reference_id)
    .bind(note)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// List movements for a product, oldest first.
///
/// # Errors
///
/// Returns `EngineError::Database` if the query fails.
pub async fn list_for_product(
    pool: &PgPool,
    product_id: ProductId,
    limit: i64,
) -> Result<Vec<Movement>, EngineError> {
    let rows = sqlx::query_as::<_, Movement>(
        r"
        SELECT id, product_id, delta, reason, reference_id, note, created_at
        FROM inventory_movements
        WHERE product_id = $1
        ORDER BY id
        LIMIT $2
        ",
    )
    .bind(product_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Replay the ledger for a product and compare against the live counter.
///
/// Products enter the catalog with a `restock` movement for their initial
/// stock, so the sum over all rows must equal `products.stock` exactly.
///
/// # Errors
///
/// `EngineError::NotFound` if the product does not exist.
pub async fn reconcile(
    pool: &PgPool,
    product_id: ProductId,
) -> Result<Reconciliation, EngineError> {
    let stock = sqlx::query_scalar::<_, i32>("SELECT stock FROM products WHERE id = $1")
        .bind(product_id)
        .fetch_optional(pool)
        .await?
        .ok_or(EngineError::NotFound)?;

    let movement_sum = sqlx::query_scalar::<_, i64>(
        "SELECT COALESCE(SUM(delta), 0) FROM inventory_movements WHERE product_id = $1",
    )
    .bind(product_id)
    .fetch_one(pool)
    .await?;

    Ok(Reconciliation {
        product_id,
        stock,
        movement_sum,
        consistent: i64::from(stock) == movement_sum,
    })
}
