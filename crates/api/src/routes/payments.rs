//! Payment outcome callback.
//!
//! The gateway integration lives outside this system; all the engine
//! consumes is a succeeded/failed event against an order. Succeeded moves
//! `pending -> paid`; failed cancels the order, which releases its stock.

use axum::{
    Json,
    extract::State,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use toy_trove_core::{OrderId, OrderStatus};
use toy_trove_engine::models::Order;

use crate::error::AppError;
use crate::state::AppState;

/// Payment outcome reported by the gateway collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentOutcome {
    Succeeded,
    Failed,
}

/// Callback request body.
#[derive(Debug, Deserialize)]
pub struct PaymentCallbackBody {
    pub order_id: i32,
    pub outcome: PaymentOutcome,
    pub reference: String,
}

/// Apply a payment outcome to an order.
#[instrument(skip(state, body), fields(order_id = body.order_id, outcome = ?body.outcome))]
pub async fn callback(
    State(state): State<AppState>,
    Json(body): Json<PaymentCallbackBody>,
) -> Result<Json<Order>, AppError> {
    let to_status = match body.outcome {
        PaymentOutcome::Succeeded => OrderStatus::Paid,
        PaymentOutcome::Failed => OrderStatus::Cancelled,
    };

    let note = format!("payment {}: {}", body.reference, match body.outcome {
        PaymentOutcome::Succeeded => "succeeded",
        PaymentOutcome::Failed => "failed",
    });

    let order = state
        .orders()
        .transition(OrderId::new(body.order_id), to_status, None, Some(&note))
        .await?;

    Ok(Json(order))
}
