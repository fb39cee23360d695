//! Product route handlers.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::{PathRejection, QueryRejection}},
};
use rust_decimal::Decimal;
use serde::Deserialize;

use storelens_core::ProductId;

use super::{MAX_PAGE_SIZE, page};
use crate::db::{AnalyticsRepository, ProductRepository};
use crate::error::AppError;
use crate::models::{Product, ProductAnalytics, ProductFilter};
use crate::state::AppState;

/// Catalog listing parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub name: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

fn price_bound(name: &str, value: Option<f64>) -> Result<Option<Decimal>, AppError> {
    value
        .map(|v| {
            if v < 0.0 {
                return Err(AppError::Validation(format!("{name} must not be negative")));
            }
            Decimal::try_from(v)
                .map_err(|_| AppError::Validation(format!("{name} is not a valid price")))
        })
        .transpose()
}

impl ListQuery {
    /// The filter part of the query.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for negative or unrepresentable prices.
    pub fn filter(&self) -> Result<ProductFilter, AppError> {
        Ok(ProductFilter {
            name: self.name.clone(),
            category: self.category.clone(),
            brand: self.brand.clone(),
            min_price: price_bound("min_price", self.min_price)?,
            max_price: price_bound("max_price", self.max_price)?,
        })
    }
}

/// List products matching the filters.
///
/// # Errors
///
/// Returns `AppError::Validation` for out-of-range pagination or bad prices.
pub async fn index(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<Product>>, AppError> {
    let Query(query) = query?;
    let page = page(query.skip, query.limit, MAX_PAGE_SIZE)?;
    let filter = query.filter()?;
    Ok(Json(
        ProductRepository::new(state.pool()).list(&filter, page).await?,
    ))
}

/// Get one product.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the product does not exist.
pub async fn show(
    State(state): State<AppState>,
    id: Result<Path<ProductId>, PathRejection>,
) -> Result<Json<Product>, AppError> {
    let Path(id) = id?;
    ProductRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("Product not found"))
}

/// Views, sales and rating rollup for one product.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the product does not exist.
pub async fn analytics(
    State(state): State<AppState>,
    id: Result<Path<ProductId>, PathRejection>,
) -> Result<Json<ProductAnalytics>, AppError> {
    let Path(id) = id?;
    AnalyticsRepository::new(state.pool())
        .product_analytics(id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("Product not found"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_converts_prices() {
        let query = ListQuery {
            min_price: Some(10.5),
            category: Some("Books".to_string()),
            ..ListQuery::default()
        };
        let filter = query.filter().expect("valid prices");
        assert_eq!(filter.min_price, Some(Decimal::new(105, 1)));
        assert!(filter.max_price.is_none());
        assert_eq!(filter.category.as_deref(), Some("Books"));
    }

    #[test]
    fn test_filter_rejects_negative_prices() {
        let query = ListQuery {
            max_price: Some(-1.0),
            ..ListQuery::default()
        };
        assert!(matches!(query.filter(), Err(AppError::Validation(_))));
    }
}
