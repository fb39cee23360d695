//! SQL aggregates behind the REST analytics endpoints.
//!
//! Each function runs a single query per entity; averages follow SQL
//! semantics and skip `NULL` durations.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, instrument};

use storelens_core::{ProductId, UserId};

use super::RepositoryError;
use crate::models::{DeviceUsage, ProductAnalytics, UserBehaviorSummary};

#[derive(sqlx::FromRow)]
struct BehaviorRow {
    id: UserId,
    name: String,
    registration_date: DateTime<Utc>,
    total_sessions: i64,
    total_purchases: i64,
    total_spent: f64,
    avg_session_duration: f64,
    favorite_category: Option<String>,
    last_session: Option<DateTime<Utc>>,
}

impl From<BehaviorRow> for UserBehaviorSummary {
    fn from(row: BehaviorRow) -> Self {
        Self {
            user_id: row.id,
            user_name: row.name,
            total_sessions: row.total_sessions,
            total_purchases: row.total_purchases,
            total_spent: row.total_spent,
            avg_session_duration: row.avg_session_duration,
            favorite_category: row.favorite_category.unwrap_or_else(|| "None".to_string()),
            last_activity: row.last_session.unwrap_or(row.registration_date),
        }
    }
}

#[derive(sqlx::FromRow)]
struct ProductStatsRow {
    id: ProductId,
    name: String,
    total_views: i64,
    total_purchases: i64,
    total_revenue: f64,
    avg_rating: f64,
}

impl From<ProductStatsRow> for ProductAnalytics {
    fn from(row: ProductStatsRow) -> Self {
        Self {
            product_id: row.id,
            product_name: row.name,
            total_views: row.total_views,
            total_purchases: row.total_purchases,
            total_revenue: row.total_revenue,
            avg_rating: row.avg_rating,
            conversion_rate: Self::conversion_rate_for(row.total_views, row.total_purchases),
        }
    }
}

#[derive(sqlx::FromRow)]
struct DeviceRow {
    device_type: String,
    session_count: i64,
    avg_duration: f64,
}

const PRODUCT_STATS_SELECT: &str = r"
    SELECT p.id, p.name,
        (SELECT COUNT(*) FROM analytics.page_views v WHERE v.product_id = p.id) AS total_views,
        (SELECT COUNT(*) FROM analytics.purchases o WHERE o.product_id = p.id) AS total_purchases,
        (SELECT COALESCE(SUM(o.total_amount), 0)::float8
            FROM analytics.purchases o WHERE o.product_id = p.id) AS total_revenue,
        (SELECT COALESCE(AVG(r.rating), 0)::float8
            FROM analytics.reviews r WHERE r.product_id = p.id) AS avg_rating
    FROM analytics.products p
";

/// Repository for aggregate analytics queries.
pub struct AnalyticsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AnalyticsRepository<'a> {
    /// Create a new analytics repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Lifetime behavior rollup for one user.
    ///
    /// The favorite category is the one with the most purchases; ties go to
    /// the alphabetically first category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn user_behavior_summary(
        &self,
        user_id: UserId,
    ) -> Result<Option<UserBehaviorSummary>, RepositoryError> {
        let row: Option<BehaviorRow> = sqlx::query_as(
            r"
            SELECT u.id, u.name, u.registration_date,
                (SELECT COUNT(*) FROM analytics.user_sessions s
                    WHERE s.user_id = u.id) AS total_sessions,
                (SELECT COUNT(*) FROM analytics.purchases o
                    WHERE o.user_id = u.id) AS total_purchases,
                (SELECT COALESCE(SUM(o.total_amount), 0)::float8 FROM analytics.purchases o
                    WHERE o.user_id = u.id) AS total_spent,
                (SELECT COALESCE(AVG(s.session_duration_minutes), 0)::float8
                    FROM analytics.user_sessions s
                    WHERE s.user_id = u.id) AS avg_session_duration,
                (SELECT p.category FROM analytics.purchases o
                    JOIN analytics.products p ON p.id = o.product_id
                    WHERE o.user_id = u.id
                    GROUP BY p.category
                    ORDER BY COUNT(*) DESC, p.category
                    LIMIT 1) AS favorite_category,
                (SELECT MAX(s.session_start) FROM analytics.user_sessions s
                    WHERE s.user_id = u.id) AS last_session
            FROM analytics.users u
            WHERE u.id = $1
            ",
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(UserBehaviorSummary::from))
    }

    /// Views, sales and rating rollup for one product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn product_analytics(
        &self,
        product_id: ProductId,
    ) -> Result<Option<ProductAnalytics>, RepositoryError> {
        let row: Option<ProductStatsRow> =
            sqlx::query_as(&format!("{PRODUCT_STATS_SELECT} WHERE p.id = $1"))
                .bind(product_id)
                .fetch_optional(self.pool)
                .await?;

        Ok(row.map(ProductAnalytics::from))
    }

    /// Rollups for the whole catalog, in product ID order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn all_product_analytics(&self) -> Result<Vec<ProductAnalytics>, RepositoryError> {
        let rows: Vec<ProductStatsRow> =
            sqlx::query_as(&format!("{PRODUCT_STATS_SELECT} ORDER BY p.id"))
                .fetch_all(self.pool)
                .await?;

        debug!(count = rows.len(), "Computed product analytics");
        Ok(rows.into_iter().map(ProductAnalytics::from).collect())
    }

    /// Session count and average duration per device class.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn device_usage(&self) -> Result<BTreeMap<String, DeviceUsage>, RepositoryError> {
        let rows: Vec<DeviceRow> = sqlx::query_as(
            r"
            SELECT device_type,
                COUNT(*) AS session_count,
                COALESCE(AVG(session_duration_minutes), 0)::float8 AS avg_duration
            FROM analytics.user_sessions
            GROUP BY device_type
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                (
                    row.device_type,
                    DeviceUsage {
                        session_count: row.session_count,
                        avg_duration: row.avg_duration,
                    },
                )
            })
            .collect())
    }

    /// Row counts per table, keyed by table name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn table_counts(&self) -> Result<BTreeMap<&'static str, i64>, RepositoryError> {
        let row: (i64, i64, i64, i64, i64, i64) = sqlx::query_as(
            r"
            SELECT
                (SELECT COUNT(*) FROM analytics.users),
                (SELECT COUNT(*) FROM analytics.products),
                (SELECT COUNT(*) FROM analytics.user_sessions),
                (SELECT COUNT(*) FROM analytics.page_views),
                (SELECT COUNT(*) FROM analytics.purchases),
                (SELECT COUNT(*) FROM analytics.reviews)
            ",
        )
        .fetch_one(self.pool)
        .await?;

        Ok(BTreeMap::from([
            ("users", row.0),
            ("products", row.1),
            ("user_sessions", row.2),
            ("page_views", row.3),
            ("purchases", row.4),
            ("reviews", row.5),
        ]))
    }
}
