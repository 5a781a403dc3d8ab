//! Seed the database with a demo toy catalog.
//!
//! Each product enters through `catalog::create_product`, so its initial
//! stock shows up as a `restock` movement and ledger replay holds from day
//! one.

use rust_decimal::Decimal;
use tracing::info;

use toy_trove_engine::catalog;
use toy_trove_engine::requests::NewProduct;

/// (name, price in cents, initial stock)
const DEMO_CATALOG: &[(&str, i64, i32)] = &[
    ("Wooden Train Set", 3499, 25),
    ("Plush Triceratops", 1899, 40),
    ("Marble Run Deluxe", 5299, 12),
    ("Stacking Rings", 999, 60),
    ("Junior Chemistry Lab", 4499, 8),
    ("Kite - Red Dragon", 1599, 30),
    ("Puzzle: World Map 500pc", 2199, 18),
    ("Wind-Up Robot", 1299, 45),
];

/// Insert the demo catalog.
///
/// # Errors
///
/// Returns an error if the database is unreachable or an insert fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let database_url = super::database_url()?;
    let pool = toy_trove_engine::create_pool(&database_url).await?;

    for &(name, price_cents, initial_stock) in DEMO_CATALOG {
        let product = catalog::create_product(
            &pool,
            NewProduct {
                name: name.to_string(),
                price: Decimal::new(price_cents, 2),
                initial_stock,
            },
        )
        .await?;
        info!(id = %product.id, name = %product.name, stock = product.stock, "seeded product");
    }

    info!(count = DEMO_CATALOG.len(), "Seed complete");
    Ok(())
}
