//! One-shot reservation expiry sweep, for deployments that schedule the
//! sweep with external cron instead of the API's in-process interval.

use tracing::info;

use toy_trove_engine::ReservationManager;

/// Expire overdue active reservations once.
///
/// # Errors
///
/// Returns an error if the database is unreachable or the update fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let database_url = super::database_url()?;
    let pool = toy_trove_engine::create_pool(&database_url).await?;

    let expired = ReservationManager::new(pool).expire_sweep().await?;
    info!(expired, "Sweep complete");
    Ok(())
}
