//! Database operations for the analytics `PostgreSQL` schema.
//!
//! # Schema: `analytics`
//!
//! ## Tables
//!
//! - `users` - Shoppers and their demographics
//! - `products` - Catalog entries
//! - `user_sessions` - Browsing sessions (device, browser, duration)
//! - `page_views` - Individual page hits inside a session
//! - `purchases` - Order lines with payment method and discount
//! - `reviews` - Star ratings and review text
//!
//! Every table is written once by the seed command and read many times by the
//! REST routes and agent tools.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p storelens-cli -- migrate
//! ```

pub mod activity;
pub mod analytics;
pub mod orders;
pub mod products;
pub mod seed;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use activity::{PageViewRepository, SessionRepository};
pub use analytics::AnalyticsRepository;
pub use orders::{PurchaseRepository, ReviewRepository};
pub use products::ProductRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,
}

impl From<storelens_core::VocabError> for RepositoryError {
    fn from(err: storelens_core::VocabError) -> Self {
        Self::DataCorruption(err.to_string())
    }
}

/// Offset pagination window shared by the list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// Rows to skip.
    pub skip: i64,
    /// Maximum rows to return.
    pub limit: i64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: 100,
        }
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
/// * `max_connections` - Upper bound on pooled connections
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(
    database_url: &secrecy::SecretString,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(2.min(max_connections))
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
