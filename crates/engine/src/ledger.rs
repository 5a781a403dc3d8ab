//! Stock ledger: the single writer of `products.stock`.
//!
//! Every function here operates on an open transaction and takes the product
//! row lock (`SELECT ... FOR UPDATE`) before reading the value it acts on,
//! holding it until the caller commits. Reading stock, computing a new value
//! in application memory, and writing it back without the lock is the classic
//! oversell race and is not expressible through this module.
//!
//! Each mutation appends exactly one movement row in the same transaction,
//! so the ledger replays to the live counter at any point in time.

use sqlx::{Postgres, Transaction};
use toy_trove_core::{MovementReason, ProductId};

use crate::error::EngineError;
use crate::models::Product;
use crate::movements;

/// Lock a product row and return its current state.
///
/// Within a transaction, re-locking an already-held row is a no-op, so
/// callers may lock up front (in sorted order, to avoid deadlocks) and still
/// call [`reserve_commit`]/[`release`] per item afterwards.
///
/// # Errors
///
/// `EngineError::NotFound` if the product does not exist.
pub async fn lock_product(
    tx: &mut Transaction<'_, Postgres>,
    product_id: ProductId,
) -> Result<Product, EngineError> {
    sqlx::query_as::<_, Product>(
        r"
        SELECT id, name, price, stock, is_active, created_at, updated_at
        FROM products
        WHERE id = $1
        FOR UPDATE
        ",
    )
    .bind(product_id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or(EngineError::NotFound)
}

/// Decrement stock for a sale, failing the whole transaction on shortfall.
///
/// Re-reads the row under the lock, checks `stock >= quantity`, decrements,
/// and appends a movement with `delta = -quantity`.
///
/// # Errors
///
/// `EngineError::InsufficientStock` if the locked row cannot cover
/// `quantity`; the caller must abort the enclosing transaction.
pub async fn reserve_commit(
    tx: &mut Transaction<'_, Postgres>,
    product_id: ProductId,
    quantity: i32,
    reason: MovementReason,
    reference_id: Option<i64>,
) -> Result<(), EngineError> {
    let stock = lock_stock(tx, product_id).await?;
    if stock < quantity {
        return Err(EngineError::InsufficientStock {
            product_id,
            available: stock,
        });
    }

    apply_delta(tx, product_id, -quantity).await?;
    movements::record(tx, product_id, -quantity, reason, reference_id, None).await?;

    tracing::debug!(product_id = %product_id, quantity, "stock committed");
    Ok(())
}

/// Return previously sold units to the saleable pool.
///
/// Used by cancellations and refunds; always paired with a movement entry
/// carrying the compensating reason.
///
/// # Errors
///
/// `EngineError::NotFound` if the product does not exist.
pub async fn release(
    tx: &mut Transaction<'_, Postgres>,
    product_id: ProductId,
    quantity: i32,
    reason: MovementReason,
    reference_id: Option<i64>,
) -> Result<(), EngineError> {
    // Lock first so the release serializes with concurrent sales.
    let _stock = lock_stock(tx, product_id).await?;

    apply_delta(tx, product_id, quantity).await?;
    movements::record(tx, product_id, quantity, reason, reference_id, None).await?;

    tracing::debug!(product_id = %product_id, quantity, %reason, "stock released");
    Ok(())
}

/// Apply an operator adjustment (restock or correction) and return the new
/// stock level.
///
/// # Errors
///
/// `EngineError::InsufficientStock` if a negative delta would drive stock
/// below zero; `EngineError::NotFound` if the product does not exist.
pub async fn adjust(
    tx: &mut Transaction<'_, Postgres>,
    product_id: ProductId,
    delta: i32,
    reason: MovementReason,
    note: Option<&str>,
) -> Result<i32, EngineError> {
    let stock = lock_stock(tx, product_id).await?;
    let new_stock = stock + delta;
    if new_stock < 0 {
        return Err(EngineError::InsufficientStock {
            product_id,
            available: stock,
        });
    }

    apply_delta(tx, product_id, delta).await?;
    movements::record(tx, product_id, delta, reason, None, note).await?;

    tracing::info!(product_id = %product_id, delta, new_stock, %reason, "stock adjusted");
    Ok(new_stock)
}

/// Lock the row and read just the stock counter.
async fn lock_stock(
    tx: &mut Transaction<'_, Postgres>,
    product_id: ProductId,
) -> Result<i32, EngineError> {
    sqlx::query_scalar::<_, i32>("SELECT stock FROM products WHERE id = $1 FOR UPDATE")
        .bind(product_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(EngineError::NotFound)
}

/// Apply a delta to the locked row. Callers have already validated the
/// resulting value; the schema CHECK is the last line of defense.
async fn apply_delta(
    tx: &mut Transaction<'_, Postgres>,
    product_id: ProductId,
    delta: i32,
) -> Result<(), EngineError> {
    sqlx::query("UPDATE products SET stock = stock + $2, updated_at = NOW() WHERE id = $1")
        .bind(product_id)
        .bind(delta)
        .execute(&mut **tx)
        .await?;
    Ok(())
}
