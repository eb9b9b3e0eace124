//! Bazaar CLI - Database migrations and operational tools.
//!
//! # Usage
//!
//! ```bash
//! # Run identity database migrations
//! bz-cli migrate
//!
//! # Print the JWKS document for the configured signing key
//! bz-cli jwks
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `jwks` - Export the public key set for downstream verifiers

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "bz-cli")]
#[command(version, about = "Bazaar CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run identity database migrations
    Migrate,
    /// Print the JWKS document for the configured signing key
    Jwks,
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
        Commands::Migrate => commands::migrate::identity().await?,
        Commands::Jwks => commands::jwks::print()?,
    }
    Ok(())
}
