//! Service banner and health checks.

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

use crate::state::AppState;

/// Human-readable service name reported by `/` and `/health`.
pub const SERVICE_NAME: &str = "E-commerce User Behavior API";

#[derive(Debug, Serialize)]
pub struct Banner {
    pub message: &'static str,
    pub docs: &'static str,
}

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub service: &'static str,
}

/// Service banner.
pub async fn root() -> Json<Banner> {
    Json(Banner {
        message: SERVICE_NAME,
        docs: "/docs",
    })
}

/// Liveness health check endpoint.
///
/// Does not check dependencies.
pub async fn health() -> Json<Health> {
    Json(Health {
        status: "healthy",
        service: SERVICE_NAME,
    })
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
