//! Okazje+ CLI - Database migrations and catalog tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! okazje-cli migrate
//!
//! # List import profiles
//! okazje-cli import profiles
//!
//! # Run an import profile without the admin service
//! okazje-cli import run --profile 3
//!
//! # Print a signed AliExpress request
//! okazje-cli aliexpress sign --method aliexpress.affiliate.product.query -p keywords=smartwatch
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "okazje-cli")]
#[command(author, version, about = "Okazje+ CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Catalog imports
    Import {
        #[command(subcommand)]
        action: ImportAction,
    },
    /// AliExpress API helpers
    #[command(name = "aliexpress")]
    AliExpress {
        #[command(subcommand)]
        action: AliExpressAction,
    },
}

#[derive(Subcommand)]
enum ImportAction {
    /// List import profiles
    Profiles,
    /// Run one import profile and print its report
    Run {
        /// Import profile ID
        #[arg(short, long)]
        profile: i32,
    },
}

#[derive(Subcommand)]
enum AliExpressAction {
    /// Sign request parameters and print them
    Sign {
        /// API method name
        #[arg(short, long)]
        method: String,

        /// Business parameter as key=value (repeatable)
        #[arg(short, long = "param", value_parser = commands::aliexpress::parse_param)]
        params: Vec<(String, String)>,
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
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Import { action } => match action {
            ImportAction::Profiles => commands::import::list_profiles().await?,
            ImportAction::Run { profile } => commands::import::run_profile(profile).await?,
        },
        Commands::AliExpress { action } => match action {
            AliExpressAction::Sign { method, params } => {
                commands::aliexpress::sign(&method, params)?;
            }
        },
    }
    Ok(())
}
