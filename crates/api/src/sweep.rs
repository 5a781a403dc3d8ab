//! Periodic reservation expiry sweep.
//!
//! The scheduler collaborator is an in-process tokio interval here; a
//! deployment that prefers external cron can disable it and drive
//! `tt-cli sweep` instead. Staleness of up to one interval is acceptable
//! because checkout re-validates against live stock under lock.

use std::time::Duration;

use tokio::task::JoinHandle;

use crate::state::AppState;

/// Spawn the background sweep loop.
pub fn spawn(state: AppState) -> JoinHandle<()> {
    let period = Duration::from_secs(state.config().sweep_interval_secs);

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        // The first tick fires immediately; skip it so startup isn't
        // serialized behind a sweep.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            match state.reservations().expire_sweep().await {
                Ok(expired) => {
                    tracing::debug!(expired, "reservation sweep completed");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "reservation sweep failed");
                }
            }
        }
    })
}
