//! Aggregate analytics endpoints.

use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use serde::Deserialize;

use super::page;
use crate::db::AnalyticsRepository;
use crate::error::AppError;
use crate::models::{DeviceUsage, ProductAnalytics, TopProductMetric};
use crate::state::AppState;

/// Largest leaderboard `/analytics/top-products` returns.
pub const MAX_TOP_PRODUCTS: i64 = 50;

#[derive(Debug, Deserialize)]
pub struct TopProductsQuery {
    pub limit: Option<i64>,
    #[serde(default)]
    pub metric: TopProductMetric,
}

/// Products ranked by the chosen metric, best first.
///
/// # Errors
///
/// Returns `AppError::Validation` if `limit` is outside `1..=50` or the metric
/// is unknown.
pub async fn top_products(
    State(state): State<AppState>,
    query: Result<Query<TopProductsQuery>, QueryRejection>,
) -> Result<Json<Vec<ProductAnalytics>>, AppError> {
    let Query(query) = query?;
    let limit = page(None, Some(query.limit.unwrap_or(10)), MAX_TOP_PRODUCTS)?.limit;
    let products = AnalyticsRepository::new(state.pool())
        .all_product_analytics()
        .await?;

    Ok(Json(ProductAnalytics::rank(
        products,
        query.metric,
        usize::try_from(limit).unwrap_or_default(),
    )))
}

/// Session count and average duration per device class.
///
/// # Errors
///
/// Returns `AppError::Database` if the query fails.
pub async fn device_usage(
    State(state): State<AppState>,
) -> Result<Json<BTreeMap<String, DeviceUsage>>, AppError> {
    Ok(Json(
        AnalyticsRepository::new(state.pool()).device_usage().await?,
    ))
}
