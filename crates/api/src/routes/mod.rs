//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (verifies database)
//!
//! # Catalog
//! GET  /products               - Active product listing
//! GET  /products/{id}          - Product detail
//!
//! # Cart (caller identity from auth headers)
//! GET    /cart                 - List cart lines
//! POST   /cart/items           - Add item (advisory availability check)
//! PUT    /cart/items/{id}      - Set line quantity
//! DELETE /cart/items/{id}      - Remove line
//! GET    /cart/validate        - Pre-checkout validation report
//!
//! # Checkout & orders
//! POST /checkout               - Convert cart into an order, then clear cart
//! GET  /orders                 - Own orders, newest first
//! GET  /orders/{id}            - Own order with items
//!
//! # Reservations
//! POST /reservations           - Place a TTL-bounded hold
//!
//! # Collaborator callbacks
//! POST /payments/callback      - Payment outcome event (succeeded/failed)
//!
//! # Admin (x-user-role: admin)
//! POST /orders/{id}/transition        - Move an order along the lifecycle
//! POST /admin/products/{id}/adjust    - Restock / manual stock correction
//! GET  /admin/products/{id}/movements - Movement ledger for a product
//! GET  /admin/products/{id}/reconcile - Ledger replay vs live counter
//! GET  /admin/orders/{id}/history     - Status audit trail
//! ```

pub mod admin;
pub mod cart;
pub mod orders;
pub mod payments;
pub mod products;
pub mod reservations;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::list))
        .route("/items", post(cart::add))
        .route("/items/{product_id}", put(cart::update).delete(cart::remove))
        .route("/validate", get(cart::validate))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/products/{id}/adjust", post(admin::adjust_stock))
        .route("/products/{id}/movements", get(admin::movements))
        .route("/products/{id}/reconcile", get(admin::reconcile))
        .route("/orders/{id}/history", get(admin::order_history))
}

/// Create the complete application router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::index))
        .route("/products/{id}", get(products::show))
        .nest("/cart", cart_routes())
        .route("/checkout", post(cart::checkout))
        .route("/orders", get(orders::index))
        .route("/orders/{id}", get(orders::show))
        .route("/orders/{id}/transition", post(orders::transition))
        .route("/reservations", post(reservations::create))
        .route("/payments/callback", post(payments::callback))
        .nest("/admin", admin_routes())
}
