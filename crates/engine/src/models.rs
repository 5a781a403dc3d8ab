//! Persisted entity types.
//!
//! These map 1:1 onto the engine tables; the schema is the durable contract,
//! so fields here change only with a migration.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use toy_trove_core::{
    MovementId, MovementReason, OrderId, OrderItemId, OrderStatus, PaymentMethod, ProductId,
    ReservationStatus, UserId,
};

/// A catalog product. `stock` is owned by the ledger; treat any read of it
/// outside a locked transaction as advisory.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub stock: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One pending cart line for a user.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CartItem {
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A cart line joined with the catalog fields the validator needs.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub stock: i32,
    pub is_active: bool,
}

/// A placed order. Created once, atomically; `total_amount` is immutable and
/// `status` moves only through the lifecycle graph.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub status: OrderStatus,
    pub total_amount: Decimal,
    pub payment_method: PaymentMethod,
    pub shipping_address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An order line with its price snapshot. Never mutated after creation.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: i32,
    pub unit_price: Decimal,
}

/// One accepted status transition, as recorded in the audit trail.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderStatusChange {
    pub id: i32,
    pub order_id: OrderId,
    pub from_status: OrderStatus,
    pub to_status: OrderStatus,
    pub changed_by: Option<UserId>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A TTL-bounded hold on available stock.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Reservation {
    pub id: Uuid,
    pub product_id: ProductId,
    pub user_id: UserId,
    pub quantity: i32,
    pub status: ReservationStatus,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One stock delta in the append-only movement ledger.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Movement {
    pub id: MovementId,
    pub product_id: ProductId,
    pub delta: i32,
    pub reason: MovementReason,
    pub reference_id: Option<i64>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}
