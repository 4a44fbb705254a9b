//! # Back Office API Entry Point
//!
//! `backoffice serve` (the default) runs the HTTP API; `backoffice migrate`
//! applies pending schema migrations and exits.

use anyhow::Context;
use clap::{Parser, Subcommand};

use backoffice::{config::ConfigLoader, db, seeds, server::run_server, telemetry};

#[derive(Parser, Debug)]
#[command(name = "backoffice")]
#[command(author, version, about = "Language school back office API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, Default)]
enum Command {
    /// Migrate, seed the admin user, and start the HTTP server
    #[default]
    Serve,
    /// Apply pending database migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration from layered env files and variables
    let config = ConfigLoader::new()
        .load()
        .context("Failed to load configuration")?;

    telemetry::init_tracing(&config)?;
    if let Ok(redacted_json) = config.redacted_json() {
        tracing::info!(profile = %config.profile, config = %redacted_json, "Configuration loaded");
    }

    let pool = db::init_pool(&config).await?;

    match cli.command.unwrap_or_default() {
        Command::Migrate => {
            db::run_migrations(&pool).await?;
            tracing::info!("Migrations complete");
            Ok(())
        }
        Command::Serve => {
            db::run_migrations(&pool).await?;
            seeds::bootstrap_admin(&pool, &config).await?;
            run_server(config, pool).await
        }
    }
}
