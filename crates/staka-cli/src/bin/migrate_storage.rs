use anyhow::{Context, Result};
use clap::Parser;
use staka_cli::init_tracing;
use staka_cli::migration::{MigrationMode, StorageMigration};
use staka_core::config::StorageMigrationConfig;
use staka_db::StorageUrlRepository;
use staka_storage::LocalStorage;

#[derive(Parser, Debug)]
#[command(name = "migrate_storage", version)]
#[command(about = "Rewrite invoice and file URLs from S3 to the local /uploads scheme")]
struct Args {
    /// Persist the rewrites. Without it the run only reports what would change.
    #[arg(long)]
    execute: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let mode = MigrationMode::from_execute_flag(args.execute);

    let config = StorageMigrationConfig::from_env()?;
    tracing::info!(
        mode = ?mode,
        markers = %config.remote_markers.join(","),
        "Starting storage URL migration"
    );

    let pool = staka_db::connect(&config.database)
        .await
        .context("Cannot reach the database")?;
    if mode == MigrationMode::Execute {
        staka_db::run_migrations(&pool).await?;
    }
    let store = StorageUrlRepository::new(pool);

    let local = if config.uploads_dir.is_dir() {
        Some(LocalStorage::open(&config.uploads_dir))
    } else {
        tracing::warn!(
            uploads_dir = %config.uploads_dir.display(),
            "Uploads directory not found, local files will not be checked"
        );
        None
    };

    let mut migration = StorageMigration::new(&store, &config.remote_markers);
    if let Some(local) = local.as_ref() {
        migration = migration.with_local_check(local);
    }

    let report = migration
        .run(mode)
        .await
        .context("Storage migration aborted")?;

    match mode {
        MigrationMode::Simulate => {
            println!(
                "Simulation: {} invoice(s) and {} file(s) would be rewritten, {} skipped, {} local file(s) missing.",
                report.invoices_pending,
                report.files_pending,
                report.skipped,
                report.missing_local_files
            );
            println!("Run again with --execute to apply.");
        }
        MigrationMode::Execute => {
            println!(
                "Migration complete: {} record(s) rewritten ({} invoice(s), {} file(s)), {} skipped, {} local file(s) missing.",
                report.total_migrated(),
                report.invoices_migrated,
                report.files_migrated,
                report.skipped,
                report.missing_local_files
            );
        }
    }
    tracing::debug!(report = %serde_json::to_string(&report)?, "Migration report");

    Ok(())
}
