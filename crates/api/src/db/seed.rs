//! Bulk loader for generated sample data.

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use tracing::{info, instrument};

use storelens_core::{ProductId, SessionId, UserId};

use super::RepositoryError;
use crate::seed::SampleData;

/// Rows written per table by [`SeedRepository::replace_all`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub users: usize,
    pub products: usize,
    pub sessions: usize,
    pub page_views: usize,
    pub purchases: usize,
    pub reviews: usize,
}

/// Repository that wipes and reloads the analytics schema.
pub struct SeedRepository<'a> {
    pool: &'a PgPool,
}

fn resolve<T: Copy>(ids: &[T], index: usize, what: &str) -> Result<T, RepositoryError> {
    ids.get(index)
        .copied()
        .ok_or_else(|| RepositoryError::DataCorruption(format!("dangling {what} index {index}")))
}

impl<'a> SeedRepository<'a> {
    /// Create a new seed repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Truncate every analytics table and insert `data` in one transaction.
    ///
    /// Identity sequences restart, so the first user is always ID 1.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails; nothing is
    /// committed in that case.
    /// Returns `RepositoryError::DataCorruption` if `data` holds an index that
    /// points outside its sibling vector.
    #[instrument(skip(self, data))]
    pub async fn replace_all(&self, data: &SampleData) -> Result<SeedReport, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r"
            TRUNCATE analytics.reviews, analytics.purchases, analytics.page_views,
                analytics.user_sessions, analytics.products, analytics.users
            RESTART IDENTITY CASCADE
            ",
        )
        .execute(&mut *tx)
        .await?;

        let mut user_ids = Vec::with_capacity(data.users.len());
        for user in &data.users {
            let id: UserId = sqlx::query_scalar(
                r"
                INSERT INTO analytics.users
                    (email, name, age, gender, location, registration_date, is_premium)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING id
                ",
            )
            .bind(&user.email)
            .bind(&user.name)
            .bind(user.age)
            .bind(user.gender)
            .bind(user.location)
            .bind(user.registration_date)
            .bind(user.is_premium)
            .fetch_one(&mut *tx)
            .await?;
            user_ids.push(id);
        }

        let mut product_ids = Vec::with_capacity(data.products.len());
        for product in &data.products {
            let id: ProductId = sqlx::query_scalar(
                r"
                INSERT INTO analytics.products
                    (name, category, price, brand, rating, stock_quantity, description)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING id
                ",
            )
            .bind(&product.name)
            .bind(product.category)
            .bind(product.price)
            .bind(product.brand)
            .bind(product.rating)
            .bind(product.stock_quantity)
            .bind(&product.description)
            .fetch_one(&mut *tx)
            .await?;
            product_ids.push(id);
        }

        let mut session_ids = Vec::with_capacity(data.sessions.len());
        for session in &data.sessions {
            #[allow(clippy::cast_precision_loss)]
            let duration = session.duration_minutes as f64;
            let id: SessionId = sqlx::query_scalar(
                r"
                INSERT INTO analytics.user_sessions
                    (user_id, session_start, session_end, session_duration_minutes,
                     pages_viewed, device_type, browser)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING id
                ",
            )
            .bind(resolve(&user_ids, session.user, "user")?)
            .bind(session.session_start)
            .bind(session.session_end)
            .bind(duration)
            .bind(session.pages_viewed)
            .bind(session.device_type.as_str())
            .bind(session.browser)
            .fetch_one(&mut *tx)
            .await?;
            session_ids.push(id);
        }

        let mut view_sessions = Vec::with_capacity(data.page_views.len());
        let mut view_products = Vec::with_capacity(data.page_views.len());
        let mut view_types = Vec::with_capacity(data.page_views.len());
        let mut view_times = Vec::with_capacity(data.page_views.len());
        let mut view_spent = Vec::with_capacity(data.page_views.len());
        for view in &data.page_views {
            view_sessions.push(resolve(&session_ids, view.session, "session")?.as_i32());
            view_products.push(
                view.product
                    .map(|p| resolve(&product_ids, p, "product").map(|id| id.as_i32()))
                    .transpose()?,
            );
            view_types.push(view.page_type.as_str());
            view_times.push(view.timestamp);
            view_spent.push(view.time_spent_seconds);
        }
        sqlx::query(
            r#"
            INSERT INTO analytics.page_views
                (session_id, product_id, page_type, "timestamp", time_spent_seconds)
            SELECT * FROM UNNEST($1::int[], $2::int[], $3::text[], $4::timestamptz[], $5::int[])
            "#,
        )
        .bind(&view_sessions)
        .bind(&view_products)
        .bind(&view_types)
        .bind(&view_times)
        .bind(&view_spent)
        .execute(&mut *tx)
        .await?;

        let mut order_users = Vec::with_capacity(data.purchases.len());
        let mut order_products = Vec::with_capacity(data.purchases.len());
        let mut order_quantities = Vec::with_capacity(data.purchases.len());
        let mut order_totals: Vec<Decimal> = Vec::with_capacity(data.purchases.len());
        let mut order_dates = Vec::with_capacity(data.purchases.len());
        let mut order_methods = Vec::with_capacity(data.purchases.len());
        let mut order_discounts = Vec::with_capacity(data.purchases.len());
        for purchase in &data.purchases {
            order_users.push(resolve(&user_ids, purchase.user, "user")?.as_i32());
            order_products.push(resolve(&product_ids, purchase.product, "product")?.as_i32());
            order_quantities.push(purchase.quantity);
            order_totals.push(purchase.total_amount);
            order_dates.push(purchase.purchase_date);
            order_methods.push(purchase.payment_method.as_str());
            order_discounts.push(purchase.discount_applied);
        }
        sqlx::query(
            r"
            INSERT INTO analytics.purchases
                (user_id, product_id, quantity, total_amount, purchase_date,
                 payment_method, discount_applied)
            SELECT * FROM UNNEST($1::int[], $2::int[], $3::int[], $4::numeric[],
                $5::timestamptz[], $6::text[], $7::float8[])
            ",
        )
        .bind(&order_users)
        .bind(&order_products)
        .bind(&order_quantities)
        .bind(&order_totals)
        .bind(&order_dates)
        .bind(&order_methods)
        .bind(&order_discounts)
        .execute(&mut *tx)
        .await?;

        let mut review_users = Vec::with_capacity(data.reviews.len());
        let mut review_products = Vec::with_capacity(data.reviews.len());
        let mut review_ratings = Vec::with_capacity(data.reviews.len());
        let mut review_texts = Vec::with_capacity(data.reviews.len());
        let mut review_dates = Vec::with_capacity(data.reviews.len());
        let mut review_votes = Vec::with_capacity(data.reviews.len());
        for review in &data.reviews {
            review_users.push(resolve(&user_ids, review.user, "user")?.as_i32());
            review_products.push(resolve(&product_ids, review.product, "product")?.as_i32());
            review_ratings.push(review.rating);
            review_texts.push(review.review_text.as_str());
            review_dates.push(review.review_date);
            review_votes.push(review.helpful_votes);
        }
        sqlx::query(
            r"
            INSERT INTO analytics.reviews
                (user_id, product_id, rating, review_text, review_date, helpful_votes)
            SELECT * FROM UNNEST($1::int[], $2::int[], $3::int[], $4::text[],
                $5::timestamptz[], $6::int[])
            ",
        )
        .bind(&review_users)
        .bind(&review_products)
        .bind(&review_ratings)
        .bind(&review_texts)
        .bind(&review_dates)
        .bind(&review_votes)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        let report = SeedReport {
            users: user_ids.len(),
            products: product_ids.len(),
            sessions: session_ids.len(),
            page_views: data.page_views.len(),
            purchases: data.purchases.len(),
            reviews: data.reviews.len(),
        };
        info!(?report, "Sample data loaded");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_maps_index_to_id() {
        let ids = [UserId::new(7), UserId::new(9)];
        assert_eq!(resolve(&ids, 1, "user").ok(), Some(UserId::new(9)));
    }

    #[test]
    fn test_resolve_rejects_dangling_index() {
        let ids = [UserId::new(7)];
        let err = resolve(&ids, 3, "user").expect_err("index 3 is out of range");
        assert!(matches!(err, RepositoryError::DataCorruption(ref msg) if msg.contains("user index 3")));
    }
}
