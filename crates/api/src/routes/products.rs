//! Catalog read handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use toy_trove_core::ProductId;
use toy_trove_engine::catalog;
use toy_trove_engine::models::Product;

use crate::error::AppError;
use crate::state::AppState;

const LISTING_LIMIT: i64 = 200;

/// List active products.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Product>>, AppError> {
    let products = catalog::list_active(state.pool(), LISTING_LIMIT).await?;
    Ok(Json(products))
}

/// Product detail.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Product>, AppError> {
    let product = catalog::get(state.pool(), ProductId::new(id))
        .await?
        .ok_or(AppError::Engine(toy_trove_engine::EngineError::NotFound))?;
    Ok(Json(product))
}
