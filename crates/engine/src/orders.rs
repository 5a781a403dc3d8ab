//! Order engine: checkout transaction and the status state machine.
//!
//! `create_order` is the consistency-critical path of the whole system. It
//! runs as one database transaction: lock the product rows in ascending-ID
//! order, re-validate, snapshot prices, insert the order and its items,
//! decrement stock through the ledger, and consume the buyer's matching
//! reservations. Any failure at any step rolls the whole thing back; a
//! half-created order with decremented stock is never observable.
//!
//! Nothing here performs network I/O while holding a lock. Payment intents
//! are created by a collaborator against the already-committed `pending`
//! order, so a slow gateway never extends lock hold time.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use sqlx::PgPool;

use toy_trove_core::{MovementReason, OrderId, OrderStatus, ProductId, UserId};

use crate::error::EngineError;
use crate::history;
use crate::ledger;
use crate::models::{Order, OrderItem};
use crate::requests::{CreateOrderRequest, OrderWithItems};
use crate::reservations;

/// The order engine. Owns order creation and every status move.
#[derive(Debug, Clone)]
pub struct OrderEngine {
    pool: PgPool,
}

impl OrderEngine {
    /// Create a new order engine over an injected pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Convert validated items into a durable order, atomically.
    ///
    /// Duplicate product lines are merged before locking so each row is
    /// locked exactly once, in ascending `ProductId` order across all
    /// callers (the fixed order prevents deadlock between concurrent
    /// multi-item checkouts).
    ///
    /// The caller clears the user's cart after this returns; cart clearing
    /// is intentionally outside the transaction.
    ///
    /// # Errors
    ///
    /// `EmptyOrder` and `Validation` before any lock is taken;
    /// `NotFound`/`Inactive`/`InsufficientStock` from the locked
    /// re-validation, each aborting the whole transaction.
    pub async fn create_order(
        &self,
        request: CreateOrderRequest,
    ) -> Result<OrderWithItems, EngineError> {
        let wanted = merge_items(&request.items)?;

        let mut tx = self.pool.begin().await?;

        // Lock and re-validate every product, accumulating the server-side
        // total from the locked rows. Client-supplied prices do not exist.
        let mut priced: Vec<(ProductId, i32, Decimal)> = Vec::with_capacity(wanted.len());
        let mut total_amount = Decimal::ZERO;
        for (&product_id, &quantity) in &wanted {
            let product = ledger::lock_product(&mut tx, product_id).await?;
            if !product.is_active {
                return Err(EngineError::Inactive(product_id));
            }
            if product.stock < quantity {
                return Err(EngineError::InsufficientStock {
                    product_id,
                    available: product.stock,
                });
            }
            total_amount += product.price * Decimal::from(quantity);
            priced.push((product_id, quantity, product.price));
        }

        let order = sqlx::query_as::<_, Order>(
            r"
            INSERT INTO orders (user_id, status, total_amount, payment_method, shipping_address)
            VALUES ($1, 'pending', $2, $3, $4)
            RETURNING id, user_id, status, total_amount, payment_method,
                      shipping_address, created_at, updated_at
            ",
        )
        .bind(request.user_id)
        .bind(total_amount)
        .bind(request.payment_method)
        .bind(&request.shipping_address)
        .fetch_one(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(priced.len());
        for &(product_id, quantity, unit_price) in &priced {
            let item = sqlx::query_as::<_, OrderItem>(
                r"
                INSERT INTO order_items (order_id, product_id, quantity, unit_price)
                VALUES ($1, $2, $3, $4)
                RETURNING id, order_id, product_id, quantity, unit_price
                ",
            )
            .bind(order.id)
            .bind(product_id)
            .bind(quantity)
            .bind(unit_price)
            .fetch_one(&mut *tx)
            .await?;
            items.push(item);

            ledger::reserve_commit(
                &mut tx,
                product_id,
                quantity,
                MovementReason::Sale,
                Some(i64::from(order.id.as_i32())),
            )
            .await?;

            reservations::consume_for_purchase(&mut tx, request.user_id, product_id).await?;
        }

        tx.commit().await?;

        tracing::info!(
            order_id = %order.id,
            user_id = %order.user_id,
            total = %order.total_amount,
            lines = items.len(),
            "order created"
        );
        Ok(OrderWithItems { order, items })
    }

    /// Move an order along the lifecycle graph.
    ///
    /// The order row is locked for the duration so racing admin and payment
    /// callers serialize; the status update and the audit row commit
    /// together. Transitions into `cancelled` or `refunded` release each
    /// line's stock back through the ledger in the same transaction.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown order; `InvalidTransition` when the move is
    /// not an edge from the current status.
    pub async fn transition(
        &self,
        order_id: OrderId,
        to_status: OrderStatus,
        actor: Option<UserId>,
        note: Option<&str>,
    ) -> Result<Order, EngineError> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Order>(
            r"
            SELECT id, user_id, status, total_amount, payment_method,
                   shipping_address, created_at, updated_at
            FROM orders
            WHERE id = $1
            FOR UPDATE
            ",
        )
        .bind(order_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(EngineError::NotFound)?;

        if !current.status.can_transition_to(to_status) {
            tracing::warn!(
                order_id = %order_id,
                from = %current.status,
                to = %to_status,
                "rejected status transition"
            );
            return Err(EngineError::InvalidTransition {
                from: current.status,
                to: to_status,
            });
        }

        let updated = sqlx::query_as::<_, Order>(
            r"
            UPDATE orders
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, user_id, status, total_amount, payment_method,
                      shipping_address, created_at, updated_at
            ",
        )
        .bind(order_id)
        .bind(to_status)
        .fetch_one(&mut *tx)
        .await?;

        history::record(&mut tx, order_id, current.status, to_status, actor, note).await?;

        if to_status.releases_stock() {
            let reason = match to_status {
                OrderStatus::Refunded => MovementReason::OrderRefunded,
                _ => MovementReason::OrderCancelled,
            };
            let items = items_tx(&mut tx, order_id).await?;
            for item in &items {
                ledger::release(
                    &mut tx,
                    item.product_id,
                    item.quantity,
                    reason,
                    Some(i64::from(order_id.as_i32())),
                )
                .await?;
            }
        }

        tx.commit().await?;

        tracing::info!(
            order_id = %order_id,
            from = %current.status,
            to = %to_status,
            "order status moved"
        );
        Ok(updated)
    }

    /// Fetch an order with its items.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Database` if the query fails.
    pub async fn get(&self, order_id: OrderId) -> Result<Option<OrderWithItems>, EngineError> {
        let order = sqlx::query_as::<_, Order>(
            r"
            SELECT id, user_id, status, total_amount, payment_method,
                   shipping_address, created_at, updated_at
            FROM orders
            WHERE id = $1
            ",
        )
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(order) = order else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, OrderItem>(
            r"
            SELECT id, order_id, product_id, quantity, unit_price
            FROM order_items
            WHERE order_id = $1
            ORDER BY id
            ",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(OrderWithItems { order, items }))
    }

    /// List a user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, EngineError> {
        let orders = sqlx::query_as::<_, Order>(
            r"
            SELECT id, user_id, status, total_amount, payment_method,
                   shipping_address, created_at, updated_at
            FROM orders
            WHERE user_id = $1
            ORDER BY created_at DESC
            ",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }
}

/// Load an order's items inside the caller's transaction.
async fn items_tx(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    order_id: OrderId,
) -> Result<Vec<OrderItem>, EngineError> {
    let items = sqlx::query_as::<_, OrderItem>(
        r"
        SELECT id, order_id, product_id, quantity, unit_price
        FROM order_items
        WHERE order_id = $1
        ORDER BY id
        ",
    )
    .bind(order_id)
    .fetch_all(&mut **tx)
    .await?;

    Ok(items)
}

/// Validate quantities and merge duplicate product lines.
///
/// The `BTreeMap` doubles as the fixed lock-acquisition order: iterating it
/// visits products in ascending ID order.
fn merge_items(
    items: &[crate::requests::OrderItemRequest],
) -> Result<BTreeMap<ProductId, i32>, EngineError> {
    if items.is_empty() {
        return Err(EngineError::EmptyOrder);
    }

    let mut wanted: BTreeMap<ProductId, i32> = BTreeMap::new();
    for item in items {
        if item.quantity <= 0 {
            return Err(EngineError::Validation(
                "quantity must be positive".to_string(),
            ));
        }
        *wanted.entry(item.product_id).or_insert(0) += item.quantity;
    }
    Ok(wanted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::requests::OrderItemRequest;

    fn item(product_id: i32, quantity: i32) -> OrderItemRequest {
        OrderItemRequest {
            product_id: ProductId::new(product_id),
            quantity,
        }
    }

    #[test]
    fn merge_rejects_empty_item_list() {
        assert!(matches!(merge_items(&[]), Err(EngineError::EmptyOrder)));
    }

    #[test]
    fn merge_rejects_non_positive_quantity() {
        assert!(matches!(
            merge_items(&[item(1, 0)]),
            Err(EngineError::Validation(_))
        ));
        assert!(matches!(
            merge_items(&[item(1, 2), item(2, -3)]),
            Err(EngineError::Validation(_))
        ));
    }

    #[test]
    fn merge_sums_duplicate_lines() {
        let merged = merge_items(&[item(5, 2), item(5, 3)]).expect("merge");
        assert_eq!(merged.get(&ProductId::new(5)), Some(&5));
        assert_eq!(merged.len(), 1);
    }

    #[test]
    fn merge_yields_ascending_lock_order() {
        let merged = merge_items(&[item(9, 1), item(2, 1), item(7, 1)]).expect("merge");
        let order: Vec<i32> = merged.keys().map(toy_trove_core::ProductId::as_i32).collect();
        assert_eq!(order, vec![2, 7, 9]);
    }
}
