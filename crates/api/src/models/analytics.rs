//! Aggregate read models served by the REST analytics endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storelens_core::{ProductId, UserId};

/// Lifetime activity rollup for a single user.
#[derive(Debug, Clone, Serialize)]
pub struct UserBehaviorSummary {
    pub user_id: UserId,
    pub user_name: String,
    pub total_sessions: i64,
    pub total_purchases: i64,
    pub total_spent: f64,
    pub avg_session_duration: f64,
    /// Category the user bought from most often, `"None"` without purchases.
    pub favorite_category: String,
    /// Latest session start, or the registration date for users who never visited.
    pub last_activity: DateTime<Utc>,
}

/// Traffic and sales rollup for a single product.
#[derive(Debug, Clone, Serialize)]
pub struct ProductAnalytics {
    pub product_id: ProductId,
    pub product_name: String,
    pub total_views: i64,
    pub total_purchases: i64,
    pub total_revenue: f64,
    pub avg_rating: f64,
    /// Purchases per hundred views, rounded to two places.
    pub conversion_rate: f64,
}

impl ProductAnalytics {
    /// Purchases as a percentage of views, `0.0` when a product was never viewed.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn conversion_rate_for(views: i64, purchases: i64) -> f64 {
        if views > 0 {
            crate::analysis::round2(purchases as f64 / views as f64 * 100.0)
        } else {
            0.0
        }
    }

    fn metric(&self, metric: TopProductMetric) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        match metric {
            TopProductMetric::Revenue => self.total_revenue,
            TopProductMetric::Views => self.total_views as f64,
            TopProductMetric::Purchases => self.total_purchases as f64,
            TopProductMetric::Rating => self.avg_rating,
        }
    }

    /// Sort descending by `metric` and keep the first `limit` entries.
    ///
    /// The sort is stable, so ties keep their incoming order.
    #[must_use]
    pub fn rank(mut products: Vec<Self>, metric: TopProductMetric, limit: usize) -> Vec<Self> {
        products.sort_by(|a, b| b.metric(metric).total_cmp(&a.metric(metric)));
        products.truncate(limit);
        products
    }
}

/// Ordering key for the top-products leaderboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TopProductMetric {
    #[default]
    Revenue,
    Views,
    Purchases,
    Rating,
}

/// Session volume and average length for one device class.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceUsage {
    pub session_count: i64,
    pub avg_duration: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analytics(id: i32, views: i64, purchases: i64, revenue: f64, rating: f64) -> ProductAnalytics {
        ProductAnalytics {
            product_id: ProductId::new(id),
            product_name: format!("Product {id}"),
            total_views: views,
            total_purchases: purchases,
            total_revenue: revenue,
            avg_rating: rating,
            conversion_rate: ProductAnalytics::conversion_rate_for(views, purchases),
        }
    }

    #[test]
    fn test_conversion_rate_zero_views() {
        assert!(ProductAnalytics::conversion_rate_for(0, 4).abs() < f64::EPSILON);
    }

    #[test]
    fn test_conversion_rate_rounds_to_two_places() {
        let rate = ProductAnalytics::conversion_rate_for(3, 1);
        assert!((rate - 33.33).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rank_by_revenue_truncates() {
        let ranked = ProductAnalytics::rank(
            vec![
                analytics(1, 10, 1, 50.0, 4.0),
                analytics(2, 10, 1, 500.0, 2.0),
                analytics(3, 10, 1, 120.0, 5.0),
            ],
            TopProductMetric::Revenue,
            2,
        );
        let ids: Vec<i32> = ranked.iter().map(|p| p.product_id.as_i32()).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn test_rank_by_rating() {
        let ranked = ProductAnalytics::rank(
            vec![analytics(1, 0, 0, 0.0, 3.5), analytics(2, 0, 0, 0.0, 4.5)],
            TopProductMetric::Rating,
            10,
        );
        assert_eq!(ranked.first().map(|p| p.product_id.as_i32()), Some(2));
    }
}
