//! Row counts per table, as a smoke check after seeding.

use storelens_api::db::AnalyticsRepository;

use super::{CommandError, connect, emit};

/// Print how many rows each analytics table holds.
///
/// # Errors
///
/// Returns an error if the database is unreachable or the schema is missing.
pub async fn run() -> Result<(), CommandError> {
    let (_, pool) = connect().await?;
    let counts = AnalyticsRepository::new(&pool).table_counts().await?;

    emit("Dataset statistics");
    emit("==================");
    for (table, count) in counts {
        emit(&format!("{table:<14} {count:>8}"));
    }
    Ok(())
}
