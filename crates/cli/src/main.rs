//! Weekly Shop CLI - database migrations and catalog seeding.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! ws-cli migrate
//!
//! # Load store locations and products
//! ws-cli seed crates/cli/seed/catalog.yaml
//!
//! # Check a catalog file without touching the database
//! ws-cli seed --check crates/cli/seed/catalog.yaml
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "ws-cli")]
#[command(author, version, about = "Weekly Shop CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Upsert store locations and products from a YAML catalog
    Seed {
        /// Path to the catalog file
        file: String,

        /// Only parse and validate the file
        #[arg(long)]
        check: bool,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { file, check } => commands::seed::catalog(&file, check).await?,
    }
    Ok(())
}
