//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;
use toy_trove_engine::{CartManager, OrderEngine, ReservationManager};

use crate::config::ApiConfig;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the database pool and the engine components.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    pool: PgPool,
    cart: CartManager,
    orders: OrderEngine,
    reservations: ReservationManager,
}

impl AppState {
    /// Create a new application state.
    ///
    /// Each engine component receives the pool explicitly; there is no
    /// ambient connection anywhere.
    #[must_use]
    pub fn new(config: ApiConfig, pool: PgPool) -> Self {
        let cart = CartManager::new(pool.clone());
        let orders = OrderEngine::new(pool.clone());
        let reservations = ReservationManager::new(pool.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                cart,
                orders,
                reservations,
            }),
        }
    }

    /// Get a reference to the API configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the cart manager.
    #[must_use]
    pub fn cart(&self) -> &CartManager {
        &self.inner.cart
    }

    /// Get a reference to the order engine.
    #[must_use]
    pub fn orders(&self) -> &OrderEngine {
        &self.inner.orders
    }

    /// Get a reference to the reservation manager.
    #[must_use]
    pub fn reservations(&self) -> &ReservationManager {
        &self.inner.reservations
    }
}
