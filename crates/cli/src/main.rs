//! Crumb Haven CLI - Database migrations, seeding and snapshot export.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! crumb-cli migrate
//!
//! # Import the bundled catalog (or a catalog file) into PostgreSQL
//! crumb-cli seed
//! crumb-cli seed --file catalog.json
//!
//! # Regenerate the static fallback snapshots
//! crumb-cli snapshot export
//! crumb-cli snapshot export --from-seed --dir /srv/snapshots
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Import a catalog into the database
//! - `snapshot export` - Write snapshot files from the Data Store

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

mod commands;

use commands::CliError;

#[derive(Parser)]
#[command(name = "crumb-cli")]
#[command(author, version, about = "Crumb Haven CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run storefront database migrations
    Migrate,
    /// Import a catalog into the database (existing slugs are skipped)
    Seed {
        /// Catalog JSON file (defaults to the bundled catalog)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Manage static fallback snapshots
    Snapshot {
        #[command(subcommand)]
        action: SnapshotAction,
    },
}

#[derive(Subcommand)]
enum SnapshotAction {
    /// Write every snapshot file
    Export {
        /// Output directory (defaults to `STOREFRONT_SNAPSHOT_DIR`)
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Export the bundled catalog instead of reading the database
        #[arg(long)]
        from_seed: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "crumb_cli=info,crumb_haven_storefront=info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { file } => {
            commands::seed::run(file.as_deref()).await?;
        }
        Commands::Snapshot { action } => match action {
            SnapshotAction::Export { dir, from_seed } => {
                commands::snapshot::export(dir, from_seed).await?;
            }
        },
    }
    Ok(())
}
