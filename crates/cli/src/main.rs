//! Toy Trove CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! tt-cli migrate
//!
//! # Seed the demo toy catalog
//! tt-cli seed
//!
//! # Expire overdue reservations once (for external cron)
//! tt-cli sweep
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run the engine schema migrations
//! - `seed` - Seed database with a demo catalog
//! - `sweep` - Run one reservation expiry sweep

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "tt-cli")]
#[command(author, version, about = "Toy Trove CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed database with a demo toy catalog
    Seed,
    /// Expire overdue reservations once
    Sweep,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed => commands::seed::run().await?,
        Commands::Sweep => commands::sweep::run().await?,
    }
    Ok(())
}
