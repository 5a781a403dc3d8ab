//! Admin back-office handlers: stock adjustment and the read-only audit
//! surfaces.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use toy_trove_core::{MovementReason, OrderId, ProductId};
use toy_trove_engine::models::{Movement, OrderStatusChange};
use toy_trove_engine::requests::Reconciliation;
use toy_trove_engine::{history, movements};

use crate::error::AppError;
use crate::middleware::RequireAdmin;
use crate::state::AppState;

const MOVEMENT_LISTING_LIMIT: i64 = 500;

/// Stock adjustment request body.
#[derive(Debug, Deserialize)]
pub struct AdjustBody {
    pub delta: i32,
    pub reason: AdjustReason,
    pub note: Option<String>,
}

/// Operator-facing subset of movement reasons. Sales and compensating
/// releases are engine-internal and cannot be written by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustReason {
    Restock,
    Adjustment,
}

impl From<AdjustReason> for MovementReason {
    fn from(reason: AdjustReason) -> Self {
        match reason {
            AdjustReason::Restock => Self::Restock,
            AdjustReason::Adjustment => Self::Adjustment,
        }
    }
}

/// Response for a stock adjustment.
#[derive(Debug, Serialize)]
pub struct AdjustResponse {
    pub product_id: ProductId,
    pub stock: i32,
}

/// Movement listing query parameters.
#[derive(Debug, Deserialize)]
pub struct MovementsQuery {
    pub limit: Option<i64>,
}

/// Apply a restock or manual correction to a product.
#[instrument(skip(state, admin, body), fields(actor = %admin.0.user_id, product_id = id))]
pub async fn adjust_stock(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(id): Path<i32>,
    Json(body): Json<AdjustBody>,
) -> Result<Json<AdjustResponse>, AppError> {
    if body.delta == 0 {
        return Err(AppError::BadRequest("delta must not be zero".to_string()));
    }

    let product_id = ProductId::new(id);
    let mut tx = state.pool().begin().await.map_err(map_sqlx)?;
    let stock = toy_trove_engine::ledger::adjust(
        &mut tx,
        product_id,
        body.delta,
        body.reason.into(),
        body.note.as_deref(),
    )
    .await?;
    tx.commit().await.map_err(map_sqlx)?;

    Ok(Json(AdjustResponse { product_id, stock }))
}

/// List the movement ledger for a product, oldest first.
#[instrument(skip(state, _admin))]
pub async fn movements(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<i32>,
    Query(query): Query<MovementsQuery>,
) -> Result<Json<Vec<Movement>>, AppError> {
    let limit = query
        .limit
        .unwrap_or(MOVEMENT_LISTING_LIMIT)
        .clamp(1, MOVEMENT_LISTING_LIMIT);
    let rows = movements::list_for_product(state.pool(), ProductId::new(id), limit).await?;
    Ok(Json(rows))
}

/// Replay the ledger for a product and compare against the live counter.
#[instrument(skip(state, _admin))]
pub async fn reconcile(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<i32>,
) -> Result<Json<Reconciliation>, AppError> {
    let report = movements::reconcile(state.pool(), ProductId::new(id)).await?;
    if !report.consistent {
        tracing::error!(
            product_id = id,
            stock = report.stock,
            movement_sum = report.movement_sum,
            "ledger replay does not match live stock"
        );
    }
    Ok(Json(report))
}

/// Status audit trail for an order, oldest first.
#[instrument(skip(state, _admin))]
pub async fn order_history(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<i32>,
) -> Result<Json<Vec<OrderStatusChange>>, AppError> {
    let rows = history::list_for_order(state.pool(), OrderId::new(id)).await?;
    Ok(Json(rows))
}

fn map_sqlx(e: sqlx::Error) -> AppError {
    AppError::Engine(toy_trove_engine::EngineError::Database(e))
}
