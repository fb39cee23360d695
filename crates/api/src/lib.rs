//! StoreLens API library.
//!
//! Analytics over a small e-commerce behavior dataset, served two ways: a
//! typed REST API over the dataset and its SQL aggregates, and a
//! keyword-routed agent layer that answers free-text questions with
//! behavior and financial reports.
//!
//! The router is built by [`app`] so the binary and the integration tests
//! share one middleware stack.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod agents;
pub mod analysis;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod seed;
pub mod state;

use axum::Router;

use state::AppState;

/// Build the full application router with its middleware stack.
///
/// Sentry layers are added by the binary, outside this router.
pub fn app(state: AppState) -> Router {
    let cors = middleware::cors_layer(state.config().cors_allow_any);

    routes::routes()
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(middleware::trace_layer())
        .layer(cors)
        .with_state(state)
}
