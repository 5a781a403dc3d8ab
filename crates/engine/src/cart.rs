//! Cart manager: per-user pending selections.
//!
//! Availability checks here are advisory. They read stock without locking so
//! the shopper gets immediate feedback, but time passes between adding to
//! cart and paying; the authoritative check is the order engine's locked
//! re-validation at checkout. This module never writes anything but the
//! `cart_items` table.

use sqlx::PgPool;
use toy_trove_core::{ProductId, UserId};

use crate::error::EngineError;
use crate::models::{CartItem, CartLine};
use crate::requests::CartValidation;

/// Manager for cart operations.
#[derive(Debug, Clone)]
pub struct CartManager {
    pool: PgPool,
}

impl CartManager {
    /// Create a new cart manager over an injected pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Add units of a product to the user's cart, merging with any existing
    /// line.
    ///
    /// # Errors
    ///
    /// `Validation` for non-positive quantities, `NotFound` for an unknown
    /// product, `Inactive` for a delisted one, and `InsufficientStock` when
    /// the advisory check `stock >= existing + quantity` fails.
    pub async fn add_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<CartItem, EngineError> {
        if quantity <= 0 {
            return Err(EngineError::Validation(
                "quantity must be positive".to_string(),
            ));
        }

        let (stock, is_active) = self.product_availability(product_id).await?;
        if !is_active {
            return Err(EngineError::Inactive(product_id));
        }

        let existing = sqlx::query_scalar::<_, i32>(
            "SELECT quantity FROM cart_items WHERE user_id = $1 AND product_id = $2",
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?
        .unwrap_or(0);

        if stock < existing + quantity {
            return Err(EngineError::InsufficientStock {
                product_id,
                available: stock,
            });
        }

        let item = sqlx::query_as::<_, CartItem>(
            r"
            INSERT INTO cart_items (user_id, product_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, product_id)
            DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity,
                          updated_at = NOW()
            RETURNING user_id, product_id, quantity, created_at, updated_at
            ",
        )
        .bind(user_id)
        .bind(product_id)
        .bind(quantity)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(user_id = %user_id, product_id = %product_id, quantity, "cart item added");
        Ok(item)
    }

    /// Set the quantity of an existing cart line.
    ///
    /// # Errors
    ///
    /// `Validation` for non-positive quantities, `NotFound` if the line does
    /// not exist, `InsufficientStock` when the advisory check fails.
    pub async fn update_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<CartItem, EngineError> {
        if quantity <= 0 {
            return Err(EngineError::Validation(
                "quantity must be positive".to_string(),
            ));
        }

        let (stock, is_active) = self.product_availability(product_id).await?;
        if !is_active {
            return Err(EngineError::Inactive(product_id));
        }
        if stock < quantity {
            return Err(EngineError::InsufficientStock {
                product_id,
                available: stock,
            });
        }

        sqlx::query_as::<_, CartItem>(
            r"
            UPDATE cart_items
            SET quantity = $3, updated_at = NOW()
            WHERE user_id = $1 AND product_id = $2
            RETURNING user_id, product_id, quantity, created_at, updated_at
            ",
        )
        .bind(user_id)
        .bind(product_id)
        .bind(quantity)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(EngineError::NotFound)
    }

    /// Remove a line from the cart.
    ///
    /// # Returns
    ///
    /// `true` if a line was removed, `false` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Database` if the query fails.
    pub async fn remove_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<bool, EngineError> {
        let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND product_id = $2")
            .bind(user_id)
            .bind(product_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List the user's cart joined with current catalog data.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Database` if the query fails.
    pub async fn items(&self, user_id: UserId) -> Result<Vec<CartLine>, EngineError> {
        let lines = sqlx::query_as::<_, CartLine>(
            r"
            SELECT c.product_id, p.name, c.quantity, p.price AS unit_price,
                   p.stock, p.is_active
            FROM cart_items c
            INNER JOIN products p ON p.id = c.product_id
            WHERE c.user_id = $1
            ORDER BY c.created_at
            ",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    /// Pre-checkout validation pass. Reports per-item problems without
    /// mutating anything; an empty cart is reported as invalid since there
    /// is nothing to check out.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Database` if the query fails.
    pub async fn validate(&self, user_id: UserId) -> Result<CartValidation, EngineError> {
        let lines = self.items(user_id).await?;

        let mut errors = Vec::new();
        if lines.is_empty() {
            errors.push("cart is empty".to_string());
        }
        for line in &lines {
            if !line.is_active {
                errors.push(format!("{} is no longer available", line.name));
            } else if line.stock < line.quantity {
                errors.push(format!(
                    "{} has insufficient stock (available: {})",
                    line.name, line.stock
                ));
            }
        }

        Ok(CartValidation {
            valid: errors.is_empty(),
            errors,
        })
    }

    /// Empty the user's cart. Called by the checkout route after the order
    /// transaction commits; deliberately not part of that transaction.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Database` if the query fails.
    pub async fn clear(&self, user_id: UserId) -> Result<u64, EngineError> {
        let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        tracing::debug!(user_id = %user_id, removed = result.rows_affected(), "cart cleared");
        Ok(result.rows_affected())
    }

    /// Non-locking read of `(stock, is_active)` for the advisory checks.
    async fn product_availability(
        &self,
        product_id: ProductId,
    ) -> Result<(i32, bool), EngineError> {
        sqlx::query_as::<_, (i32, bool)>(
            "SELECT stock, is_active FROM products WHERE id = $1",
        )
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(EngineError::NotFound)
    }
}
