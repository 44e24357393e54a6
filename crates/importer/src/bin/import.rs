use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use importer::{PointsImporter, find_sheets};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "import")]
#[command(about = "Volleyball league bulk data importer", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Add the point deltas of one CSV sheet to the players' totals
    Points {
        file: PathBuf,

        #[arg(long)]
        validate_only: bool,
    },
    /// Apply every CSV sheet of a directory, one transaction per sheet
    BulkPoints {
        #[arg(long, default_value = "./imports")]
        directory: PathBuf,

        #[arg(long)]
        validate_only: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("import={},importer={}", log_level, log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&cli.database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::Points {
            file,
            validate_only,
        } => handle_points_import(&pool, &file, validate_only).await,
        Commands::BulkPoints {
            directory,
            validate_only,
        } => handle_bulk_points(&pool, &directory, validate_only).await,
    }
}

async fn handle_points_import(
    pool: &sqlx::PgPool,
    file: &Path,
    validate_only: bool,
) -> anyhow::Result<()> {
    tracing::info!("Loading points sheet from: {}", file.display());

    let summary = PointsImporter::new(pool)
        .import_file(file, validate_only)
        .await
        .with_context(|| format!("Failed to import {}", file.display()))?;

    if validate_only {
        tracing::info!(
            "✓ Validation successful: {} rows for {} players, nothing written",
            summary.rows_read,
            summary.players_updated
        );
    } else {
        tracing::info!(
            "✓ Import completed: {} rows, {} players updated",
            summary.rows_read,
            summary.players_updated
        );
    }

    Ok(())
}

async fn handle_bulk_points(
    pool: &sqlx::PgPool,
    directory: &Path,
    validate_only: bool,
) -> anyhow::Result<()> {
    tracing::info!("Scanning directory for points sheets: {}", directory.display());

    let sheets = find_sheets(directory).await?;
    if sheets.is_empty() {
        tracing::warn!("No CSV files found in {}", directory.display());
        return Ok(());
    }
    tracing::info!("Found {} points sheet(s)", sheets.len());

    let importer = PointsImporter::new(pool);
    let mut success_count = 0;
    let mut error_count = 0;

    for (idx, path) in sheets.iter().enumerate() {
        tracing::info!("[{}/{}] Processing: {}", idx + 1, sheets.len(), path.display());

        match importer.import_file(path, validate_only).await {
            Ok(summary) => {
                success_count += 1;
                tracing::info!("  ✓ {} players updated", summary.players_updated);
            }
            Err(e) => {
                error_count += 1;
                tracing::error!("  ✗ Error: {}", e);
            }
        }
    }

    tracing::info!("Summary: {} succeeded, {} failed", success_count, error_count);

    if error_count > 0 {
        bail!("{} sheet(s) failed to import", error_count);
    }

    Ok(())
}
