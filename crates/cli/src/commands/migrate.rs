//! Database migration command.
//!
//! Runs the engine's embedded migrations. The API binary never migrates on
//! startup; this command is the one place the schema moves forward.

use tracing::info;

/// Run the engine schema migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let database_url = super::database_url()?;

    info!("Connecting to database...");
    let pool = toy_trove_engine::create_pool(&database_url).await?;

    info!("Running engine migrations...");
    toy_trove_engine::MIGRATOR.run(&pool).await?;

    info!("Migrations complete");
    Ok(())
}
