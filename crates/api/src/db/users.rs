//! User repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, instrument};

use storelens_core::UserId;

use super::{Page, RepositoryError};
use crate::models::User;

const USER_COLUMNS: &str = "id, email, name, age, gender, location, registration_date, is_premium";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: UserId,
    email: String,
    name: String,
    age: Option<i32>,
    gender: Option<String>,
    location: Option<String>,
    registration_date: DateTime<Utc>,
    is_premium: bool,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            name: row.name,
            age: row.age,
            gender: row.gender,
            location: row.location,
            registration_date: row.registration_date,
            is_premium: row.is_premium,
        }
    }
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List users ordered by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn list(&self, page: Page) -> Result<Vec<User>, RepositoryError> {
        let rows: Vec<UserRow> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS} FROM analytics.users ORDER BY id OFFSET $1 LIMIT $2"
        ))
        .bind(page.skip)
        .bind(page.limit)
        .fetch_all(self.pool)
        .await?;

        debug!(count = rows.len(), "Listed users");
        Ok(rows.into_iter().map(User::from).collect())
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn get(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS} FROM analytics.users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    /// Load every user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn all(&self) -> Result<Vec<User>, RepositoryError> {
        let rows: Vec<UserRow> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS} FROM analytics.users ORDER BY id"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    /// Count all users.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM analytics.users")
            .fetch_one(self.pool)
            .await?;
        Ok(row.0)
    }
}
