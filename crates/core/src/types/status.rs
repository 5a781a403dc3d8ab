//! Domain enums: order lifecycle, reservations, payments, stock movements.
//!
//! The order status graph is data here, not behavior scattered across
//! handlers. Everything that mutates an order goes through
//! [`OrderStatus::can_transition_to`], so the set of legal lifecycles is
//! auditable in one place.

use serde::{Deserialize, Serialize};

/// Order lifecycle status.
///
/// ```text
/// pending ──► paid ──► processing ──► shipped ──► delivered
///    │          │           │                         │
///    │          │           │                         ▼
///    └──────────┴───────────┴──► cancelled        refunded
///               └────────────────► refunded
/// ```
///
/// `cancelled` and `refunded` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "order_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Paid,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Refunded,
}

impl OrderStatus {
    /// The statuses reachable from `self` in one step.
    #[must_use]
    pub const fn allowed_transitions(self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::Paid, Self::Cancelled],
            Self::Paid => &[Self::Processing, Self::Cancelled, Self::Refunded],
            Self::Processing => &[Self::Shipped, Self::Cancelled],
            Self::Shipped => &[Self::Delivered],
            Self::Delivered => &[Self::Refunded],
            Self::Cancelled | Self::Refunded => &[],
        }
    }

    /// Whether `self -> to` is an edge of the lifecycle graph.
    #[must_use]
    pub fn can_transition_to(self, to: Self) -> bool {
        self.allowed_transitions().contains(&to)
    }

    /// Terminal statuses have no outgoing edges.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Cancelled | Self::Refunded)
    }

    /// Whether entering this status hands the order's stock back to the
    /// saleable pool. The engine pairs these transitions with a compensating
    /// ledger release.
    #[must_use]
    pub const fn releases_stock(self) -> bool {
        matches!(self, Self::Cancelled | Self::Refunded)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
            Self::Refunded => "refunded",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "processing" => Ok(Self::Processing),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            "refunded" => Ok(Self::Refunded),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

/// Status of an inventory reservation (a time-bounded advisory hold).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "reservation_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    /// Hold is live and shrinks the product's available stock.
    Active,
    /// TTL elapsed; the sweep flipped the hold off.
    Expired,
    /// The reserved units were bought at checkout.
    Consumed,
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Active => "active",
            Self::Expired => "expired",
            Self::Consumed => "consumed",
        };
        write!(f, "{s}")
    }
}

/// How an order is paid.
///
/// The gateway integration itself lives outside this system; the engine only
/// records the method and consumes succeeded/failed callback events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "payment_method", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Card,
    CashOnDelivery,
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Card => "card",
            Self::CashOnDelivery => "cash_on_delivery",
        };
        write!(f, "{s}")
    }
}

/// Cause of a stock delta in the inventory movement ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "movement_reason", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum MovementReason {
    /// Checkout decrement.
    Sale,
    /// Positive manual adjustment receiving new units.
    Restock,
    /// Operator correction, either direction.
    Adjustment,
    /// Compensating release when an order is cancelled.
    OrderCancelled,
    /// Compensating release when an order is refunded.
    OrderRefunded,
}

impl std::fmt::Display for MovementReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Sale => "sale",
            Self::Restock => "restock",
            Self::Adjustment => "adjustment",
            Self::OrderCancelled => "order_cancelled",
            Self::OrderRefunded => "order_refunded",
        };
        write!(f, "{s}")
    }
}
