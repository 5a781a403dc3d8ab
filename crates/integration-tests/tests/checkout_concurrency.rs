//! Concurrency tests for order creation.
//!
//! These tests require a `PostgreSQL` database:
//! - Set `TOYTROVE_TEST_DATABASE_URL` to a scratch database
//! - Run with: cargo test -p toy-trove-integration-tests -- --ignored

use toy_trove_core::PaymentMethod;
use toy_trove_engine::requests::{CreateOrderRequest, OrderItemRequest};
use toy_trove_engine::{EngineError, OrderEngine};
use toy_trove_integration_tests::{create_test_product, test_pool, test_user};

fn order_request(
    user: toy_trove_core::UserId,
    items: Vec<OrderItemRequest>,
) -> CreateOrderRequest {
    CreateOrderRequest {
        user_id: user,
        items,
        shipping_address: "1 Toybox Lane".to_string(),
        payment_method: PaymentMethod::Card,
    }
}

#[tokio::test]
#[ignore = "requires PostgreSQL test database"]
async fn concurrent_orders_for_last_unit_sell_exactly_once() {
    let pool = test_pool().await;
    let product = create_test_product(&pool, 1999, 1).await;
    let engine = OrderEngine::new(pool.clone());

    let buy = |user| {
        let engine = engine.clone();
        let items = vec![OrderItemRequest {
            product_id: product.id,
            quantity: 1,
        }];
        async move { engine.create_order(order_request(user, items)).await }
    };

    let (first, second) = tokio::join!(buy(test_user()), buy(test_user()));

    // Exactly one buyer wins; the loser sees the live row value, not a stale read.
    let outcomes = [first, second];
    let wins = outcomes.iter().filter(|r| r.is_ok()).count();
    assert_eq!(wins, 1, "exactly one order should be created");
    let loss = outcomes
        .iter()
        .find(|r| r.is_err())
        .expect("one call must lose");
    assert!(matches!(
        loss.as_ref().unwrap_err(),
        EngineError::InsufficientStock { available: 0, .. }
    ));

    let stock = sqlx::query_scalar::<_, i32>("SELECT stock FROM products WHERE id = $1")
        .bind(product.id)
        .fetch_one(&pool)
        .await
        .expect("fetch stock");
    assert_eq!(stock, 0);
}

#[tokio::test]
#[ignore = "requires PostgreSQL test database"]
async fn committed_quantity_never_exceeds_initial_stock() {
    let pool = test_pool().await;
    let product = create_test_product(&pool, 999, 5).await;
    let engine = OrderEngine::new(pool.clone());

    // Ten buyers race for five units, two at a time each.
    let mut tasks = Vec::new();
    for _ in 0..10 {
        let engine = engine.clone();
        let product_id = product.id;
        tasks.push(tokio::spawn(async move {
            engine
                .create_order(order_request(
                    test_user(),
                    vec![OrderItemRequest {
                        product_id,
                        quantity: 2,
                    }],
                ))
                .await
        }));
    }

    let mut sold = 0;
    for task in tasks {
        if task.await.expect("task").is_ok() {
            sold += 2;
        }
    }

    assert!(sold <= 5, "sold {sold} units of 5");

    let stock = sqlx::query_scalar::<_, i32>("SELECT stock FROM products WHERE id = $1")
        .bind(product.id)
        .fetch_one(&pool)
        .await
        .expect("fetch stock");
    assert_eq!(stock, 5 - sold);
}

#[tokio::test]
#[ignore = "requires PostgreSQL test database"]
async fn overlapping_multi_item_orders_do_not_deadlock() {
    let pool = test_pool().await;
    let a = create_test_product(&pool, 1499, 10).await;
    let b = create_test_product(&pool, 2499, 10).await;
    let engine = OrderEngine::new(pool.clone());

    // Items arrive in opposite client order; the engine locks in ascending
    // product-ID order for all callers, so these serialize instead of
    // deadlocking.
    let forward = vec![
        OrderItemRequest { product_id: a.id, quantity: 1 },
        OrderItemRequest { product_id: b.id, quantity: 1 },
    ];
    let backward = vec![
        OrderItemRequest { product_id: b.id, quantity: 1 },
        OrderItemRequest { product_id: a.id, quantity: 1 },
    ];

    let e1 = engine.clone();
    let e2 = engine;
    let (first, second) = tokio::join!(
        e1.create_order(order_request(test_user(), forward)),
        e2.create_order(order_request(test_user(), backward)),
    );

    first.expect("forward order");
    second.expect("backward order");
}
