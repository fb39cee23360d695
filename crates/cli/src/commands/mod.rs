//! CLI subcommands.

pub mod migrate;
pub mod query;
pub mod seed;
pub mod stats;

use sqlx::PgPool;
use thiserror::Error;

use storelens_api::config::{ApiConfig, ConfigError};
use storelens_api::db::{self, RepositoryError};

/// Errors that can stop a CLI command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Invalid(String),
}

/// Load configuration and connect to the analytics database.
pub async fn connect() -> Result<(ApiConfig, PgPool), CommandError> {
    let config = ApiConfig::from_env()?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&config.database_url, config.db_max_connections).await?;
    Ok((config, pool))
}

/// Write a command's result to stdout.
#[allow(clippy::print_stdout)]
pub fn emit(text: &str) {
    println!("{text}");
}
