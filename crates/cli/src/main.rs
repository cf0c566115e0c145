//! Moda Brasil CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Create the document and session tables
//! mb-cli migrate
//!
//! # Load the demo catalog
//! mb-cli seed products
//!
//! # Promote a user to storefront partner
//! mb-cli user set-role --uid 3f2a9c... --role seller
//! ```
//!
//! All commands read `STOREFRONT_DATABASE_URL` (or `DATABASE_URL`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use moda_brasil_core::UserRole;

mod commands;

#[derive(Parser)]
#[command(name = "mb-cli")]
#[command(author, version, about = "Moda Brasil CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations (documents and sessions)
    Migrate,
    /// Seed the database
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
    /// Manage user profiles
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Write the demo products (idempotent)
    Products,
}

#[derive(Subcommand)]
enum UserAction {
    /// Change a user's role
    SetRole {
        /// Account uid
        #[arg(short, long)]
        uid: String,

        /// New role (`customer`, `seller`, `admin`)
        #[arg(short, long)]
        role: UserRole,
    },
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
        Commands::Seed { target } => match target {
            SeedTarget::Products => commands::seed::products().await?,
        },
        Commands::User { action } => match action {
            UserAction::SetRole { uid, role } => commands::user::set_role(&uid, role).await?,
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_set_role() {
        let cli = Cli::try_parse_from(["mb-cli", "user", "set-role", "-u", "abc", "-r", "seller"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::User {
                action: UserAction::SetRole { role: UserRole::Seller, .. }
            })
        ));
    }
}
