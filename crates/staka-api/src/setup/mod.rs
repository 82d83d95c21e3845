//! Application setup and initialization

pub mod database;
pub mod routes;
pub mod server;

use crate::state::AppState;
use anyhow::{Context, Result};
use staka_core::Config;
use staka_db::{FileRepository, TariffRepository};
use staka_storage::LocalStorage;
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    crate::telemetry::init_telemetry(config.is_production());
    tracing::info!(
        environment = %config.environment,
        "Configuration loaded and validated successfully"
    );

    let pool = database::setup_database(&config).await?;

    let storage = LocalStorage::new(&config.uploads_dir)
        .await
        .context("Failed to initialize local storage")?;
    tracing::info!(uploads_dir = %config.uploads_dir.display(), "Local storage ready");

    let state = Arc::new(AppState::new(
        config.clone(),
        Arc::new(TariffRepository::new(pool.clone())),
        Arc::new(FileRepository::new(pool)),
        Arc::new(storage),
    ));

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
