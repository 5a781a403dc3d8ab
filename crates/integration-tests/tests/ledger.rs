//! Ledger properties: atomicity of checkout, movement replay, price
//! snapshots, and the cart's advisory validation.
//!
//! Requires `TOYTROVE_TEST_DATABASE_URL`; run with `-- --ignored`.

use rust_decimal::Decimal;
use toy_trove_core::{MovementReason, PaymentMethod};
use toy_trove_engine::requests::{CreateOrderRequest, OrderItemRequest};
use toy_trove_engine::{CartManager, EngineError, OrderEngine, ledger, movements};
use toy_trove_integration_tests::{create_test_product, test_pool, test_user};

#[tokio::test]
#[ignore = "requires PostgreSQL test database"]
async fn failed_checkout_leaves_no_trace() {
    let pool = test_pool().await;
    let plenty = create_test_product(&pool, 1999, 10).await;
    let scarce = create_test_product(&pool, 2999, 1).await;
    let engine = OrderEngine::new(pool.clone());
    let buyer = test_user();

    // The second line fails the locked check, so the whole order must vanish:
    // no order row, no stock change on the first product, no movements.
    let result = engine
        .create_order(CreateOrderRequest {
            user_id: buyer,
            items: vec![
                OrderItemRequest { product_id: plenty.id, quantity: 2 },
                OrderItemRequest { product_id: scarce.id, quantity: 3 },
            ],
            shipping_address: "1 Toybox Lane".to_string(),
            payment_method: PaymentMethod::Card,
        })
        .await;
    assert!(matches!(
        result,
        Err(EngineError::InsufficientStock { available: 1, .. })
    ));

    let order_count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM orders WHERE user_id = $1")
        .bind(buyer)
        .fetch_one(&pool)
        .await
        .expect("count orders");
    assert_eq!(order_count, 0);

    let stock = sqlx::query_scalar::<_, i32>("SELECT stock FROM products WHERE id = $1")
        .bind(plenty.id)
        .fetch_one(&pool)
        .await
        .expect("fetch stock");
    assert_eq!(stock, 10);

    let ledger_rows = movements::list_for_product(&pool, plenty.id, 100)
        .await
        .expect("movements");
    assert!(
        ledger_rows.iter().all(|m| m.reason == MovementReason::Restock),
        "only the seed restock may exist"
    );
}

#[tokio::test]
#[ignore = "requires PostgreSQL test database"]
async fn movement_replay_reconstructs_stock_at_every_step() {
    let pool = test_pool().await;
    let product = create_test_product(&pool, 1499, 20).await;
    let engine = OrderEngine::new(pool.clone());

    let check = |pool: sqlx::PgPool, product_id| async move {
        let report = movements::reconcile(&pool, product_id).await.expect("reconcile");
        assert!(
            report.consistent,
            "stock {} != replay {}",
            report.stock, report.movement_sum
        );
    };

    check(pool.clone(), product.id).await;

    // Sale
    let order = engine
        .create_order(CreateOrderRequest {
            user_id: test_user(),
            items: vec![OrderItemRequest { product_id: product.id, quantity: 4 }],
            shipping_address: "1 Toybox Lane".to_string(),
            payment_method: PaymentMethod::Card,
        })
        .await
        .expect("order");
    check(pool.clone(), product.id).await;

    // Manual correction downward
    let mut tx = pool.begin().await.expect("begin");
    ledger::adjust(&mut tx, product.id, -2, MovementReason::Adjustment, Some("damaged units"))
        .await
        .expect("adjust");
    tx.commit().await.expect("commit");
    check(pool.clone(), product.id).await;

    // Restock
    let mut tx = pool.begin().await.expect("begin");
    ledger::adjust(&mut tx, product.id, 7, MovementReason::Restock, None)
        .await
        .expect("restock");
    tx.commit().await.expect("commit");
    check(pool.clone(), product.id).await;

    // Compensating release via cancellation
    engine
        .transition(order.order.id, toy_trove_core::OrderStatus::Cancelled, None, None)
        .await
        .expect("cancel");
    check(pool.clone(), product.id).await;
}

#[tokio::test]
#[ignore = "requires PostgreSQL test database"]
async fn adjustment_cannot_drive_stock_negative() {
    let pool = test_pool().await;
    let product = create_test_product(&pool, 1499, 3).await;

    let mut tx = pool.begin().await.expect("begin");
    let result = ledger::adjust(&mut tx, product.id, -5, MovementReason::Adjustment, None).await;
    assert!(matches!(
        result,
        Err(EngineError::InsufficientStock { available: 3, .. })
    ));
}

#[tokio::test]
#[ignore = "requires PostgreSQL test database"]
async fn catalog_price_changes_do_not_rewrite_history() {
    let pool = test_pool().await;
    let product = create_test_product(&pool, 1000, 5).await;
    let engine = OrderEngine::new(pool.clone());
    let buyer = test_user();

    let order = engine
        .create_order(CreateOrderRequest {
            user_id: buyer,
            items: vec![OrderItemRequest { product_id: product.id, quantity: 2 }],
            shipping_address: "1 Toybox Lane".to_string(),
            payment_method: PaymentMethod::Card,
        })
        .await
        .expect("order");
    assert_eq!(order.order.total_amount, Decimal::new(2000, 2));

    // Reprice the product well above the snapshot.
    sqlx::query("UPDATE products SET price = $2 WHERE id = $1")
        .bind(product.id)
        .bind(Decimal::new(99_99, 2))
        .execute(&pool)
        .await
        .expect("reprice");

    let reloaded = engine
        .get(order.order.id)
        .await
        .expect("get")
        .expect("order exists");
    assert_eq!(reloaded.order.total_amount, Decimal::new(2000, 2));
    assert_eq!(reloaded.items[0].unit_price, Decimal::new(1000, 2));
}

#[tokio::test]
#[ignore = "requires PostgreSQL test database"]
async fn cart_validate_reports_shortfalls_without_mutating() {
    let pool = test_pool().await;
    let product = create_test_product(&pool, 1099, 3).await;
    let cart = CartManager::new(pool.clone());
    let buyer = test_user();

    cart.add_item(buyer, product.id, 3).await.expect("add");

    // Stock shrinks after the line was added; validation must cite the live
    // availability.
    let mut tx = pool.begin().await.expect("begin");
    ledger::adjust(&mut tx, product.id, -2, MovementReason::Adjustment, None)
        .await
        .expect("adjust");
    tx.commit().await.expect("commit");

    let report = cart.validate(buyer).await.expect("validate");
    assert!(!report.valid);
    assert_eq!(report.errors.len(), 1);
    assert!(
        report.errors[0].contains("insufficient stock (available: 1)"),
        "unexpected message: {}",
        report.errors[0]
    );

    // Nothing moved: the line is intact and stock is what the adjustment left.
    let lines = cart.items(buyer).await.expect("items");
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].quantity, 3);
}
