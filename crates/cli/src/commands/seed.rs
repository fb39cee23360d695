//! Sample data command.
//!
//! Generates a deterministic dataset relative to the current time and
//! replaces everything in the analytics schema with it.

use chrono::Utc;
use tracing::info;

use storelens_api::db::seed::SeedRepository;
use storelens_api::seed::{SeedPlan, generate};

use super::{CommandError, connect};

/// Clear the analytics tables and load generated sample data.
///
/// # Errors
///
/// Returns an error if `users` or `products` is zero, or if the database
/// write fails; nothing is committed in that case.
pub async fn run(users: usize, products: usize, seed: u64) -> Result<(), CommandError> {
    if users == 0 || products == 0 {
        return Err(CommandError::Invalid(
            "--users and --products must be at least 1".to_string(),
        ));
    }

    let (_, pool) = connect().await?;

    let plan = SeedPlan {
        users,
        products,
        seed,
    };
    info!(?plan, "Generating sample data");
    let data = generate(plan, Utc::now());

    let report = SeedRepository::new(&pool).replace_all(&data).await?;

    info!("Seeding complete!");
    info!("  Users: {}", report.users);
    info!("  Products: {}", report.products);
    info!("  Sessions: {}", report.sessions);
    info!("  Page views: {}", report.page_views);
    info!("  Purchases: {}", report.purchases);
    info!("  Reviews: {}", report.reviews);
    Ok(())
}
