//! Session and page-view listings.

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use serde::Deserialize;

use storelens_core::{SessionId, UserId};

use super::{MAX_PAGE_SIZE, page};
use crate::db::{PageViewRepository, SessionRepository};
use crate::error::AppError;
use crate::models::{PageView, UserSession};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SessionQuery {
    pub user_id: Option<UserId>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct PageViewQuery {
    pub session_id: Option<SessionId>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

/// List sessions, optionally for one user.
///
/// # Errors
///
/// Returns `AppError::Validation` for out-of-range pagination.
pub async fn sessions(
    State(state): State<AppState>,
    query: Result<Query<SessionQuery>, QueryRejection>,
) -> Result<Json<Vec<UserSession>>, AppError> {
    let Query(query) = query?;
    let page = page(query.skip, query.limit, MAX_PAGE_SIZE)?;
    Ok(Json(
        SessionRepository::new(state.pool())
            .list(query.user_id, page)
            .await?,
    ))
}

/// List page views, optionally for one session.
///
/// # Errors
///
/// Returns `AppError::Validation` for out-of-range pagination.
pub async fn page_views(
    State(state): State<AppState>,
    query: Result<Query<PageViewQuery>, QueryRejection>,
) -> Result<Json<Vec<PageView>>, AppError> {
    let Query(query) = query?;
    let page = page(query.skip, query.limit, MAX_PAGE_SIZE)?;
    Ok(Json(
        PageViewRepository::new(state.pool())
            .list(query.session_id, page)
            .await?,
    ))
}
