//! Engine error taxonomy.
//!
//! Domain conditions (insufficient stock, invalid transition, empty order)
//! are values the caller must handle, not exceptions. Only `Database` is an
//! infrastructure failure, and it always means the enclosing transaction
//! rolled back whole.

use thiserror::Error;
use toy_trove_core::{OrderStatus, ProductId};

/// Errors returned by engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Order creation was attempted with no items.
    #[error("order must contain at least one item")]
    EmptyOrder,

    /// Input rejected before any lock was taken (non-positive quantity, bad TTL).
    #[error("invalid request: {0}")]
    Validation(String),

    /// The locked product row cannot cover the requested quantity.
    #[error("insufficient stock for product {product_id} (available: {available})")]
    InsufficientStock {
        product_id: ProductId,
        available: i32,
    },

    /// The product exists but is not sellable.
    #[error("product {0} is no longer available")]
    Inactive(ProductId),

    /// The requested move is not an edge of the order lifecycle graph.
    #[error("invalid status transition: {from} -> {to}")]
    InvalidTransition {
        from: OrderStatus,
        to: OrderStatus,
    },

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Database error from sqlx. The transaction it occurred in is gone.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl EngineError {
    /// Whether this is a domain condition the caller is expected to handle,
    /// as opposed to an infrastructure failure.
    #[must_use]
    pub const fn is_domain(&self) -> bool {
        !matches!(self, Self::Database(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use toy_trove_core::OrderStatus;

    #[test]
    fn insufficient_stock_names_the_shortfall() {
        let err = EngineError::InsufficientStock {
            product_id: ProductId::new(3),
            available: 1,
        };
        assert_eq!(
            err.to_string(),
            "insufficient stock for product 3 (available: 1)"
        );
        assert!(err.is_domain());
    }

    #[test]
    fn invalid_transition_names_both_ends() {
        let err = EngineError::InvalidTransition {
            from: OrderStatus::Pending,
            to: OrderStatus::Shipped,
        };
        assert_eq!(err.to_string(), "invalid status transition: pending -> shipped");
    }
}
