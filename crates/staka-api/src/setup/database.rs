//! Database setup

use anyhow::Result;
use sqlx::PgPool;
use staka_core::Config;

/// Connect to Postgres and apply pending migrations.
pub async fn setup_database(config: &Config) -> Result<PgPool> {
    let pool = staka_db::connect(&config.database).await?;
    staka_db::run_migrations(&pool).await?;
    Ok(pool)
}
