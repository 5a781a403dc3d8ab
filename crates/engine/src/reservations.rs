//! Reservation manager: TTL-bounded advisory holds on available stock.
//!
//! Active holds shrink a product's *available* stock (what a buyer may newly
//! reserve), never the physical counter, so expiry is a pure status flip and
//! requires no ledger entry. A reservation is not a guarantee past its TTL:
//! checkout always re-validates against live stock under lock.

use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use toy_trove_core::{ProductId, UserId};

use crate::error::EngineError;
use crate::ledger;
use crate::models::Reservation;
use crate::requests::CreateReservationRequest;

/// Manager for inventory reservations.
#[derive(Debug, Clone)]
pub struct ReservationManager {
    pool: PgPool,
}

impl ReservationManager {
    /// Create a new reservation manager over an injected pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Place a hold on available stock.
    ///
    /// Available = `stock - SUM(active reservations)`, computed under the
    /// product row lock so concurrent holds serialize and the invariant
    /// `sum(active) <= stock` is preserved.
    ///
    /// # Errors
    ///
    /// `Validation` for non-positive quantity or TTL, `Inactive`/`NotFound`
    /// for unsellable products, `InsufficientStock` when the hold does not
    /// fit in the available window.
    pub async fn create(
        &self,
        request: CreateReservationRequest,
    ) -> Result<Reservation, EngineError> {
        if request.quantity <= 0 {
            return Err(EngineError::Validation(
                "quantity must be positive".to_string(),
            ));
        }
        if request.ttl_minutes <= 0 {
            return Err(EngineError::Validation(
                "ttl_minutes must be positive".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let product = ledger::lock_product(&mut tx, request.product_id).await?;
        if !product.is_active {
            return Err(EngineError::Inactive(request.product_id));
        }

        let held = active_quantity_tx(&mut tx, request.product_id).await?;
        let available = i64::from(product.stock) - held;
        if available < i64::from(request.quantity) {
            return Err(EngineError::InsufficientStock {
                product_id: request.product_id,
                available: i32::try_from(available.max(0)).unwrap_or(i32::MAX),
            });
        }

        let reservation = sqlx::query_as::<_, Reservation>(
            r"
            INSERT INTO inventory_reservations
                (id, product_id, user_id, quantity, status, expires_at)
            VALUES ($1, $2, $3, $4, 'active', NOW() + make_interval(mins => $5))
            RETURNING id, product_id, user_id, quantity, status, expires_at,
                      created_at, updated_at
            ",
        )
        .bind(Uuid::new_v4())
        .bind(request.product_id)
        .bind(request.user_id)
        .bind(request.quantity)
        .bind(request.ttl_minutes)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            reservation_id = %reservation.id,
            product_id = %reservation.product_id,
            quantity = reservation.quantity,
            "reservation created"
        );
        Ok(reservation)
    }

    /// Flip every overdue active hold to `expired`.
    ///
    /// Invoked periodically; a hold may outlive its TTL by up to one sweep
    /// interval, which is fine because checkout is the final authority.
    /// Physical stock is never touched here.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Database` if the update fails.
    pub async fn expire_sweep(&self) -> Result<u64, EngineError> {
        let result = sqlx::query(
            r"
            UPDATE inventory_reservations
            SET status = 'expired', updated_at = NOW()
            WHERE status = 'active' AND expires_at < NOW()
            ",
        )
        .execute(&self.pool)
        .await?;

        let expired = result.rows_affected();
        if expired > 0 {
            tracing::info!(expired, "reservation sweep expired holds");
        }
        Ok(expired)
    }

    /// Look up a reservation by ID.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Database` if the query fails.
    pub async fn get(&self, id: Uuid) -> Result<Option<Reservation>, EngineError> {
        let reservation = sqlx::query_as::<_, Reservation>(
            r"
            SELECT id, product_id, user_id, quantity, status, expires_at,
                   created_at, updated_at
            FROM inventory_reservations
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(reservation)
    }

    /// Total quantity currently held by active reservations for a product.
    /// Advisory outside a transaction; the locked variant backs `create`.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Database` if the query fails.
    pub async fn active_quantity(&self, product_id: ProductId) -> Result<i64, EngineError> {
        let held = sqlx::query_scalar::<_, i64>(
            r"
            SELECT COALESCE(SUM(quantity), 0)
            FROM inventory_reservations
            WHERE product_id = $1 AND status = 'active'
            ",
        )
        .bind(product_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(held)
    }
}

/// Sum of active holds for a product, inside the caller's transaction.
async fn active_quantity_tx(
    tx: &mut Transaction<'_, Postgres>,
    product_id: ProductId,
) -> Result<i64, EngineError> {
    let held = sqlx::query_scalar::<_, i64>(
        r"
        SELECT COALESCE(SUM(quantity), 0)
        FROM inventory_reservations
        WHERE product_id = $1 AND status = 'active'
        ",
    )
    .bind(product_id)
    .fetch_one(&mut **tx)
    .await?;

    Ok(held)
}

/// Mark the buyer's active holds on a product as consumed. Called from the
/// checkout transaction so the flip commits with the sale.
pub(crate) async fn consume_for_purchase(
    tx: &mut Transaction<'_, Postgres>,
    user_id: UserId,
    product_id: ProductId,
) -> Result<u64, EngineError> {
    let result = sqlx::query(
        r"
        UPDATE inventory_reservations
        SET status = 'consumed', updated_at = NOW()
        WHERE user_id = $1 AND product_id = $2 AND status = 'active'
        ",
    )
    .bind(user_id)
    .bind(product_id)
    .execute(&mut **tx)
    .await?;

    Ok(result.rows_affected())
}
