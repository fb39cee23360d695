//! Database migration command.
//!
//! Migrations live in `crates/api/migrations/` and are embedded at build time.

use super::{CommandError, connect};

/// Apply pending migrations to the analytics database.
///
/// # Errors
///
/// Returns an error if configuration is missing, the database is unreachable
/// or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let (_, pool) = connect().await?;

    tracing::info!("Running analytics migrations...");
    sqlx::migrate!("../api/migrations").run(&pool).await?;

    tracing::info!("Analytics migrations complete!");
    Ok(())
}
