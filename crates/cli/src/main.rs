//! Vendor Hub CLI - migrations and operator tools.
//!
//! # Usage
//!
//! ```bash
//! # Create the dashboard schema, session store and preference tables
//! vh-cli migrate
//!
//! # Look up an address the way the store setup form does
//! vh-cli geocode search "Cho Ben Thanh"
//! vh-cli geocode reverse 10.7721 106.6983
//!
//! # Print the delivery status transition table
//! vh-cli transitions
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "vh-cli")]
#[command(author, version, about = "Vendor Hub CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run dashboard database migrations
    Migrate,
    /// Query the geocoding API
    Geocode {
        #[command(subcommand)]
        action: GeocodeAction,
    },
    /// Print the delivery status transition table
    Transitions,
}

#[derive(Subcommand)]
enum GeocodeAction {
    /// Search for an address
    Search {
        /// Free-text address
        query: String,
    },
    /// Name the place at a point
    Reverse {
        #[arg(allow_negative_numbers = true)]
        lat: f64,
        #[arg(allow_negative_numbers = true)]
        lon: f64,
    },
}

#[tokio::main]
async fn main() {
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
        Commands::Migrate => commands::migrate::dashboard().await?,
        Commands::Geocode { action } => match action {
            GeocodeAction::Search { query } => commands::geocode::search(&query).await?,
            GeocodeAction::Reverse { lat, lon } => commands::geocode::reverse(lat, lon).await?,
        },
        Commands::Transitions => commands::transitions::print_table(),
    }
    Ok(())
}
