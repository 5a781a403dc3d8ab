//! Typed request and response shapes for engine operations.
//!
//! Callers construct these explicitly; there is no loosely-shaped payload
//! anywhere between the HTTP boundary and the database.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use toy_trove_core::{PaymentMethod, ProductId, UserId};

use crate::models::{Order, OrderItem};

/// Input to [`crate::OrderEngine::create_order`].
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderRequest {
    pub user_id: UserId,
    pub items: Vec<OrderItemRequest>,
    pub shipping_address: String,
    pub payment_method: PaymentMethod,
}

/// One requested line of a new order.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct OrderItemRequest {
    pub product_id: ProductId,
    pub quantity: i32,
}

/// An order together with its line items, as returned to the API layer.
#[derive(Debug, Clone, Serialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Input to [`crate::ReservationManager::create`].
#[derive(Debug, Clone, Deserialize)]
pub struct CreateReservationRequest {
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: i32,
    pub ttl_minutes: i32,
}

/// Result of a pre-checkout cart validation pass. Advisory only; the
/// authoritative check happens under lock at checkout.
#[derive(Debug, Clone, Serialize)]
pub struct CartValidation {
    pub valid: bool,
    pub errors: Vec<String>,
}

/// Ledger replay versus the live counter for one product.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Reconciliation {
    pub product_id: ProductId,
    pub stock: i32,
    pub movement_sum: i64,
    pub consistent: bool,
}

/// Input to [`crate::catalog::create_product`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub price: Decimal,
    pub initial_stock: i32,
}
