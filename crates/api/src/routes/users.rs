//! User route handlers.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::{PathRejection, QueryRejection}},
};
use serde::Deserialize;

use storelens_core::UserId;

use super::{MAX_PAGE_SIZE, page};
use crate::db::{AnalyticsRepository, UserRepository};
use crate::error::AppError;
use crate::models::{User, UserBehaviorSummary};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

/// List users by ID.
///
/// # Errors
///
/// Returns `AppError::Validation` for out-of-range pagination.
pub async fn index(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<User>>, AppError> {
    let Query(query) = query?;
    let page = page(query.skip, query.limit, MAX_PAGE_SIZE)?;
    Ok(Json(UserRepository::new(state.pool()).list(page).await?))
}

/// Get one user.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the user does not exist.
pub async fn show(
    State(state): State<AppState>,
    id: Result<Path<UserId>, PathRejection>,
) -> Result<Json<User>, AppError> {
    let Path(id) = id?;
    UserRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("User not found"))
}

/// Lifetime behavior summary for one user.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the user does not exist.
pub async fn behavior(
    State(state): State<AppState>,
    id: Result<Path<UserId>, PathRejection>,
) -> Result<Json<UserBehaviorSummary>, AppError> {
    let Path(id) = id?;
    AnalyticsRepository::new(state.pool())
        .user_behavior_summary(id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("User not found"))
}
