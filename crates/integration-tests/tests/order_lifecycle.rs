//! Order state machine tests: legal walks, rejected jumps, compensating
//! releases, and audit-trail closure.
//!
//! Requires `TOYTROVE_TEST_DATABASE_URL`; run with `-- --ignored`.

use toy_trove_core::{MovementReason, OrderStatus, PaymentMethod, UserId};
use toy_trove_engine::requests::{CreateOrderRequest, OrderItemRequest};
use toy_trove_engine::{EngineError, OrderEngine, history, movements};
use toy_trove_integration_tests::{create_test_product, test_pool, test_user};

async fn place_order(
    engine: &OrderEngine,
    user: UserId,
    product_id: toy_trove_core::ProductId,
    quantity: i32,
) -> toy_trove_engine::requests::OrderWithItems {
    engine
        .create_order(CreateOrderRequest {
            user_id: user,
            items: vec![OrderItemRequest {
                product_id,
                quantity,
            }],
            shipping_address: "1 Toybox Lane".to_string(),
            payment_method: PaymentMethod::Card,
        })
        .await
        .expect("order creation")
}

#[tokio::test]
#[ignore = "requires PostgreSQL test database"]
async fn pending_cannot_jump_to_shipped() {
    let pool = test_pool().await;
    let product = create_test_product(&pool, 1299, 5).await;
    let engine = OrderEngine::new(pool.clone());

    let order = place_order(&engine, test_user(), product.id, 1).await;

    let result = engine
        .transition(order.order.id, OrderStatus::Shipped, None, None)
        .await;

    assert!(matches!(
        result,
        Err(EngineError::InvalidTransition {
            from: OrderStatus::Pending,
            to: OrderStatus::Shipped,
        })
    ));

    // The rejected move left no trace.
    let trail = history::list_for_order(&pool, order.order.id)
        .await
        .expect("history");
    assert!(trail.is_empty());
}

#[tokio::test]
#[ignore = "requires PostgreSQL test database"]
async fn cancelling_a_paid_order_releases_its_stock() {
    let pool = test_pool().await;
    let product = create_test_product(&pool, 1299, 10).await;
    let engine = OrderEngine::new(pool.clone());
    let admin = test_user();

    let order = place_order(&engine, test_user(), product.id, 3).await;
    engine
        .transition(order.order.id, OrderStatus::Paid, None, Some("payment ok"))
        .await
        .expect("pending -> paid");
    engine
        .transition(order.order.id, OrderStatus::Cancelled, Some(admin), None)
        .await
        .expect("paid -> cancelled");

    let stock = sqlx::query_scalar::<_, i32>("SELECT stock FROM products WHERE id = $1")
        .bind(product.id)
        .fetch_one(&pool)
        .await
        .expect("fetch stock");
    assert_eq!(stock, 10, "cancelled stock returns to the saleable pool");

    let ledger = movements::list_for_product(&pool, product.id, 100)
        .await
        .expect("movements");
    let releases: Vec<_> = ledger
        .iter()
        .filter(|m| m.reason == MovementReason::OrderCancelled)
        .collect();
    assert_eq!(releases.len(), 1);
    assert_eq!(releases[0].delta, 3);
    assert_eq!(
        releases[0].reference_id,
        Some(i64::from(order.order.id.as_i32()))
    );
}

#[tokio::test]
#[ignore = "requires PostgreSQL test database"]
async fn full_walk_is_recorded_as_a_valid_chain() {
    let pool = test_pool().await;
    let product = create_test_product(&pool, 899, 5).await;
    let engine = OrderEngine::new(pool.clone());
    let admin = test_user();

    let order = place_order(&engine, test_user(), product.id, 1).await;
    let walk = [
        OrderStatus::Paid,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Refunded,
    ];
    for to in walk {
        engine
            .transition(order.order.id, to, Some(admin), None)
            .await
            .unwrap_or_else(|e| panic!("transition to {to}: {e}"));
    }

    let trail = history::list_for_order(&pool, order.order.id)
        .await
        .expect("history");
    assert_eq!(trail.len(), walk.len());

    // Chronological chain: row N's to_status is row N+1's from_status, and
    // every pair is an edge of the lifecycle graph.
    let mut cursor = OrderStatus::Pending;
    for row in &trail {
        assert_eq!(row.from_status, cursor);
        assert!(
            row.from_status.can_transition_to(row.to_status),
            "{} -> {} is not an edge",
            row.from_status,
            row.to_status
        );
        cursor = row.to_status;
    }
    assert_eq!(cursor, OrderStatus::Refunded);

    // Refund released the unit back.
    let stock = sqlx::query_scalar::<_, i32>("SELECT stock FROM products WHERE id = $1")
        .bind(product.id)
        .fetch_one(&pool)
        .await
        .expect("fetch stock");
    assert_eq!(stock, 5);
}

#[tokio::test]
#[ignore = "requires PostgreSQL test database"]
async fn terminal_orders_reject_every_move() {
    let pool = test_pool().await;
    let product = create_test_product(&pool, 1599, 5).await;
    let engine = OrderEngine::new(pool.clone());

    let order = place_order(&engine, test_user(), product.id, 1).await;
    engine
        .transition(order.order.id, OrderStatus::Cancelled, None, None)
        .await
        .expect("pending -> cancelled");

    for to in [
        OrderStatus::Paid,
        OrderStatus::Processing,
        OrderStatus::Refunded,
    ] {
        let result = engine.transition(order.order.id, to, None, None).await;
        assert!(
            matches!(result, Err(EngineError::InvalidTransition { .. })),
            "cancelled -> {to} must be rejected"
        );
    }
}
