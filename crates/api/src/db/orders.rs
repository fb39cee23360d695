//! Purchase and review repositories.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, instrument};

use storelens_core::{PaymentMethod, ProductId, PurchaseId, ReviewId, UserId};

use super::{Page, RepositoryError};
use crate::models::{Purchase, Review};

const PURCHASE_COLUMNS: &str = "id, user_id, product_id, quantity, total_amount, purchase_date, \
     payment_method, discount_applied";

const REVIEW_COLUMNS: &str =
    "id, user_id, product_id, rating, review_text, review_date, helpful_votes";

#[derive(sqlx::FromRow)]
struct PurchaseRow {
    id: PurchaseId,
    user_id: UserId,
    product_id: ProductId,
    quantity: i32,
    total_amount: Decimal,
    purchase_date: DateTime<Utc>,
    payment_method: String,
    discount_applied: f64,
}

impl TryFrom<PurchaseRow> for Purchase {
    type Error = RepositoryError;

    fn try_from(row: PurchaseRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            product_id: row.product_id,
            quantity: row.quantity,
            total_amount: row.total_amount,
            purchase_date: row.purchase_date,
            payment_method: row.payment_method.parse::<PaymentMethod>()?,
            discount_applied: row.discount_applied,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ReviewRow {
    id: ReviewId,
    user_id: UserId,
    product_id: ProductId,
    rating: i32,
    review_text: Option<String>,
    review_date: DateTime<Utc>,
    helpful_votes: i32,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            product_id: row.product_id,
            rating: row.rating,
            review_text: row.review_text,
            review_date: row.review_date,
            helpful_votes: row.helpful_votes,
        }
    }
}

fn into_purchases(rows: Vec<PurchaseRow>) -> Result<Vec<Purchase>, RepositoryError> {
    rows.into_iter().map(Purchase::try_from).collect()
}

/// Repository for purchases.
pub struct PurchaseRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PurchaseRepository<'a> {
    /// Create a new purchase repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List purchases, optionally for one user, ordered by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored payment method is unknown.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        user_id: Option<UserId>,
        page: Page,
    ) -> Result<Vec<Purchase>, RepositoryError> {
        let rows: Vec<PurchaseRow> = sqlx::query_as(&format!(
            r"
            SELECT {PURCHASE_COLUMNS}
            FROM analytics.purchases
            WHERE ($1::int IS NULL OR user_id = $1)
            ORDER BY id
            OFFSET $2 LIMIT $3
            "
        ))
        .bind(user_id)
        .bind(page.skip)
        .bind(page.limit)
        .fetch_all(self.pool)
        .await?;

        debug!(count = rows.len(), "Listed purchases");
        into_purchases(rows)
    }

    /// Purchases made in `[from, until)`, optionally for one user, oldest first.
    ///
    /// `until = None` leaves the window open-ended.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored payment method is unknown.
    #[instrument(skip(self))]
    pub async fn made_between(
        &self,
        from: DateTime<Utc>,
        until: Option<DateTime<Utc>>,
        user_id: Option<UserId>,
    ) -> Result<Vec<Purchase>, RepositoryError> {
        let rows: Vec<PurchaseRow> = sqlx::query_as(&format!(
            r"
            SELECT {PURCHASE_COLUMNS}
            FROM analytics.purchases
            WHERE purchase_date >= $1
              AND ($2::timestamptz IS NULL OR purchase_date < $2)
              AND ($3::int IS NULL OR user_id = $3)
            ORDER BY purchase_date, id
            "
        ))
        .bind(from)
        .bind(until)
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        into_purchases(rows)
    }

    /// Load every purchase, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored payment method is unknown.
    pub async fn all(&self) -> Result<Vec<Purchase>, RepositoryError> {
        let rows: Vec<PurchaseRow> = sqlx::query_as(&format!(
            "SELECT {PURCHASE_COLUMNS} FROM analytics.purchases ORDER BY purchase_date, id"
        ))
        .fetch_all(self.pool)
        .await?;

        into_purchases(rows)
    }
}

/// Repository for product reviews.
pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List reviews, optionally for one product, ordered by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        product_id: Option<ProductId>,
        page: Page,
    ) -> Result<Vec<Review>, RepositoryError> {
        let rows: Vec<ReviewRow> = sqlx::query_as(&format!(
            r"
            SELECT {REVIEW_COLUMNS}
            FROM analytics.reviews
            WHERE ($1::int IS NULL OR product_id = $1)
            ORDER BY id
            OFFSET $2 LIMIT $3
            "
        ))
        .bind(product_id)
        .bind(page.skip)
        .bind(page.limit)
        .fetch_all(self.pool)
        .await?;

        debug!(count = rows.len(), "Listed reviews");
        Ok(rows.into_iter().map(Review::from).collect())
    }
}
