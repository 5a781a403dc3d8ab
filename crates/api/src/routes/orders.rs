//! Order read and transition handlers.
//!
//! Shoppers see only their own orders. Transitions are an admin operation;
//! the payment callback (`routes::payments`) is the other path into the
//! state machine.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use tracing::instrument;

use toy_trove_core::{OrderId, OrderStatus};
use toy_trove_engine::EngineError;
use toy_trove_engine::models::Order;
use toy_trove_engine::requests::OrderWithItems;

use crate::error::AppError;
use crate::middleware::{AuthUser, RequireAdmin};
use crate::state::AppState;

/// Transition request body.
#[derive(Debug, Deserialize)]
pub struct TransitionBody {
    pub to_status: OrderStatus,
    pub note: Option<String>,
}

/// List the caller's orders.
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn index(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<Order>>, AppError> {
    let orders = state.orders().list_for_user(user.user_id).await?;
    Ok(Json(orders))
}

/// Fetch one of the caller's orders with items.
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn show(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
) -> Result<Json<OrderWithItems>, AppError> {
    let order = state
        .orders()
        .get(OrderId::new(id))
        .await?
        .ok_or(AppError::Engine(EngineError::NotFound))?;

    // Another user's order is indistinguishable from a missing one.
    if order.order.user_id != user.user_id {
        return Err(AppError::Engine(EngineError::NotFound));
    }

    Ok(Json(order))
}

/// Move an order along the lifecycle graph (admin).
#[instrument(skip(state, admin, body), fields(actor = %admin.0.user_id))]
pub async fn transition(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(id): Path<i32>,
    Json(body): Json<TransitionBody>,
) -> Result<Json<Order>, AppError> {
    let order = state
        .orders()
        .transition(
            OrderId::new(id),
            body.to_status,
            Some(admin.0.user_id),
            body.note.as_deref(),
        )
        .await?;
    Ok(Json(order))
}
