//! CLI subcommand implementations.

pub mod migrate;
pub mod seed;
pub mod sweep;

use secrecy::SecretString;

/// Resolve the database URL the way the API does: specific variable first,
/// generic `DATABASE_URL` as fallback.
pub(crate) fn database_url() -> Result<SecretString, Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    std::env::var("TOYTROVE_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| "TOYTROVE_DATABASE_URL not set".into())
}
