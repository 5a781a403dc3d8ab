//! Order status audit trail: append-only transition records.
//!
//! One row per accepted transition, written inside the transaction that
//! moves the order. The chain of `from_status -> to_status` rows for an
//! order is a walk over the lifecycle graph, in chronological order.

use sqlx::{PgPool, Postgres, Transaction};
use toy_trove_core::{OrderId, OrderStatus, UserId};

use crate::error::EngineError;
use crate::models::OrderStatusChange;

/// Append one transition row. Only the order engine calls this.
pub(crate) async fn record(
    tx: &mut Transaction<'_, Postgres>,
    order_id: OrderId,
    from_status: OrderStatus,
    to_status: OrderStatus,
    changed_by: Option<UserId>,
    note: Option<&str>,
) -> Result<(), EngineError> {
    sqlx::query(
        r"
        INSERT INTO order_status_history (order_id, from_status, to_status, changed_by, note)
        VALUES ($1, $2, $3, $4, $5)
        ",
    )
    .bind(order_id)
    .bind(from_status)
    .bind(to_status)
    .bind(changed_by)
    .bind(note)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// List the audit trail for an order, oldest first.
///
/// # Errors
///
/// Returns `EngineError::Database` if the query fails.
pub async fn list_for_order(
    pool: &PgPool,
    order_id: OrderId,
) -> Result<Vec<OrderStatusChange>, EngineError> {
    let rows = sqlx::query_as::<_, OrderStatusChange>(
        r"
        SELECT id, order_id, from_status, to_status, changed_by, note, created_at
        FROM order_status_history
        WHERE order_id = $1
        ORDER BY created_at, id
        ",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
