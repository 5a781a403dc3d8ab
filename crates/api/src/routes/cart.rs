//! Cart and checkout route handlers.
//!
//! Cart responses reflect advisory availability only. The checkout handler
//! is where the engine's locked re-validation decides who actually gets the
//! stock; clearing the cart happens after that transaction commits, since
//! the cart is not part of the consistency-critical path.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use toy_trove_core::{PaymentMethod, ProductId};
use toy_trove_engine::models::{CartItem, CartLine};
use toy_trove_engine::requests::{
    CartValidation, CreateOrderRequest, OrderItemRequest, OrderWithItems,
};

use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::state::AppState;

/// Add-to-cart request body.
#[derive(Debug, Deserialize)]
pub struct AddItemBody {
    pub product_id: i32,
    pub quantity: i32,
}

/// Quantity update request body.
#[derive(Debug, Deserialize)]
pub struct UpdateItemBody {
    pub quantity: i32,
}

/// Checkout request body. Items come from the stored cart, never the client.
#[derive(Debug, Deserialize)]
pub struct CheckoutBody {
    pub shipping_address: String,
    pub payment_method: PaymentMethod,
}

/// List the caller's cart.
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<CartLine>>, AppError> {
    let lines = state.cart().items(user.user_id).await?;
    Ok(Json(lines))
}

/// Add units of a product to the cart.
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn add(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<AddItemBody>,
) -> Result<(StatusCode, Json<CartItem>), AppError> {
    let item = state
        .cart()
        .add_item(user.user_id, ProductId::new(body.product_id), body.quantity)
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Set the quantity of a cart line.
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(product_id): Path<i32>,
    Json(body): Json<UpdateItemBody>,
) -> Result<Json<CartItem>, AppError> {
    let item = state
        .cart()
        .update_item(user.user_id, ProductId::new(product_id), body.quantity)
        .await?;
    Ok(Json(item))
}

/// Remove a cart line.
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn remove(
    State(state): State<AppState>,
    user: AuthUser,
    Path(product_id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let removed = state
        .cart()
        .remove_item(user.user_id, ProductId::new(product_id))
        .await?;
    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Engine(toy_trove_engine::EngineError::NotFound))
    }
}

/// Pre-checkout validation report. Mutates nothing.
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn validate(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<CartValidation>, AppError> {
    let report = state.cart().validate(user.user_id).await?;
    Ok(Json(report))
}

/// Convert the caller's cart into an order.
#[instrument(skip(state, user, body), fields(user_id = %user.user_id))]
pub async fn checkout(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<CheckoutBody>,
) -> Result<(StatusCode, Json<OrderWithItems>), AppError> {
    if body.shipping_address.trim().is_empty() {
        return Err(AppError::BadRequest(
            "shipping_address must not be empty".to_string(),
        ));
    }

    let lines = state.cart().items(user.user_id).await?;
    let items: Vec<OrderItemRequest> = lines
        .iter()
        .map(|line| OrderItemRequest {
            product_id: line.product_id,
            quantity: line.quantity,
        })
        .collect();

    let order = state
        .orders()
        .create_order(CreateOrderRequest {
            user_id: user.user_id,
            items,
            shipping_address: body.shipping_address,
            payment_method: body.payment_method,
        })
        .await?;

    // Post-commit: the order exists regardless of whether this cleanup
    // succeeds, so a failure here is logged rather than surfaced.
    if let Err(e) = state.cart().clear(user.user_id).await {
        tracing::error!(user_id = %user.user_id, error = %e, "failed to clear cart after checkout");
    }

    Ok((StatusCode::CREATED, Json(order)))
}
