//! Purchase and review listings.

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use serde::Deserialize;

use storelens_core::{ProductId, UserId};

use super::{MAX_PAGE_SIZE, page};
use crate::db::{PurchaseRepository, ReviewRepository};
use crate::error::AppError;
use crate::models::{Purchase, Review};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PurchaseQuery {
    pub user_id: Option<UserId>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewQuery {
    pub product_id: Option<ProductId>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

/// List purchases, optionally for one user.
///
/// # Errors
///
/// Returns `AppError::Validation` for out-of-range pagination.
pub async fn purchases(
    State(state): State<AppState>,
    query: Result<Query<PurchaseQuery>, QueryRejection>,
) -> Result<Json<Vec<Purchase>>, AppError> {
    let Query(query) = query?;
    let page = page(query.skip, query.limit, MAX_PAGE_SIZE)?;
    Ok(Json(
        PurchaseRepository::new(state.pool())
            .list(query.user_id, page)
            .await?,
    ))
}

/// List reviews, optionally for one product.
///
/// # Errors
///
/// Returns `AppError::Validation` for out-of-range pagination.
pub async fn reviews(
    State(state): State<AppState>,
    query: Result<Query<ReviewQuery>, QueryRejection>,
) -> Result<Json<Vec<Review>>, AppError> {
    let Query(query) = query?;
    let page = page(query.skip, query.limit, MAX_PAGE_SIZE)?;
    Ok(Json(
        ReviewRepository::new(state.pool())
            .list(query.product_id, page)
            .await?,
    ))
}
