//! Reservation route handlers.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use toy_trove_core::ProductId;
use toy_trove_engine::models::Reservation;
use toy_trove_engine::requests::CreateReservationRequest;

use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::state::AppState;

/// Reservation request body.
#[derive(Debug, Deserialize)]
pub struct CreateReservationBody {
    pub product_id: i32,
    pub quantity: i32,
    pub ttl_minutes: i32,
}

/// Place a TTL-bounded hold on available stock.
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<CreateReservationBody>,
) -> Result<(StatusCode, Json<Reservation>), AppError> {
    let reservation = state
        .reservations()
        .create(CreateReservationRequest {
            user_id: user.user_id,
            product_id: ProductId::new(body.product_id),
            quantity: body.quantity,
            ttl_minutes: body.ttl_minutes,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(reservation)))
}
