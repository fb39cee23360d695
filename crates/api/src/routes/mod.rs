//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                          - Service banner
//! GET  /health                    - Liveness
//! GET  /health/ready              - Readiness (database reachable)
//!
//! # Dataset
//! GET  /users                     - Paginated users
//! GET  /users/{id}                - One user
//! GET  /users/{id}/behavior       - Lifetime behavior summary
//! GET  /products                  - Paginated, filterable catalog
//! GET  /products/{id}             - One product
//! GET  /products/{id}/analytics   - Views, sales and rating rollup
//! GET  /sessions                  - Sessions, optionally for one user
//! GET  /page-views                - Page views, optionally for one session
//! GET  /purchases                 - Purchases, optionally for one user
//! GET  /reviews                   - Reviews, optionally for one product
//!
//! # Analytics
//! GET  /analytics/top-products    - Leaderboard by revenue, views, purchases or rating
//! GET  /analytics/device-usage    - Sessions and average duration per device
//!
//! # Agents
//! POST /agents/query              - Natural-language query
//! GET  /agents/capabilities       - Registered agents
//! GET  /agents/tools              - Prefixed tool catalogue
//! POST /agents/tools/{tool}       - Run one tool
//! POST /agents/collaborate        - Cross-agent analysis
//! GET  /agents/route              - Explain routing for a query
//! GET  /agents/history            - Routed-query log
//! ```

pub mod activity;
pub mod agents;
pub mod analytics;
pub mod home;
pub mod orders;
pub mod products;
pub mod users;

use axum::{
    Router,
    routing::{get, post},
};

use crate::db::Page;
use crate::error::AppError;
use crate::state::AppState;

/// Largest page a list endpoint returns.
pub const MAX_PAGE_SIZE: i64 = 1000;

/// Default page size for list endpoints.
pub const DEFAULT_PAGE_SIZE: i64 = 100;

/// Validate `skip`/`limit` query parameters into a [`Page`].
///
/// # Errors
///
/// Returns `AppError::Validation` if `skip` is negative or `limit` is outside
/// `1..=max_limit`.
pub fn page(skip: Option<i64>, limit: Option<i64>, max_limit: i64) -> Result<Page, AppError> {
    let skip = skip.unwrap_or(0);
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE.min(max_limit));

    if skip < 0 {
        return Err(AppError::Validation(
            "skip must be greater than or equal to 0".to_string(),
        ));
    }
    if !(1..=max_limit).contains(&limit) {
        return Err(AppError::Validation(format!(
            "limit must be between 1 and {max_limit}"
        )));
    }
    Ok(Page { skip, limit })
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(users::index))
        .route("/{id}", get(users::show))
        .route("/{id}/behavior", get(users::behavior))
}

fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
        .route("/{id}/analytics", get(products::analytics))
}

fn analytics_routes() -> Router<AppState> {
    Router::new()
        .route("/top-products", get(analytics::top_products))
        .route("/device-usage", get(analytics::device_usage))
}

fn agent_routes() -> Router<AppState> {
    Router::new()
        .route("/query", post(agents::query))
        .route("/capabilities", get(agents::capabilities))
        .route("/tools", get(agents::tools))
        .route("/tools/{tool}", post(agents::call_tool))
        .route("/collaborate", post(agents::collaborate))
        .route("/route", get(agents::route))
        .route("/history", get(agents::history))
}

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::root))
        .route("/health", get(home::health))
        .route("/health/ready", get(home::readiness))
        .nest("/users", user_routes())
        .nest("/products", product_routes())
        .route("/sessions", get(activity::sessions))
        .route("/page-views", get(activity::page_views))
        .route("/purchases", get(orders::purchases))
        .route("/reviews", get(orders::reviews))
        .nest("/analytics", analytics_routes())
        .nest("/agents", agent_routes())
}
