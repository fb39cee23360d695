//! Unified error handling for the API.
//!
//! Every error renders as `{ "detail": "..." }`. Server-side failures are
//! captured to Sentry and logged; clients only see "Internal server error".

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::agents::ToolError;
use crate::db::RepositoryError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// An agent tool failed.
    #[error(transparent)]
    Tool(#[from] ToolError),

    /// Resource not found; the message is shown as-is.
    #[error("{0}")]
    NotFound(&'static str),

    /// Request parameters failed validation.
    #[error("{0}")]
    Validation(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Tool(e) if e.is_client_error() => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Tool(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Don't expose internal error details to clients
        let detail = if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "API request error"
            );
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        assert_eq!(AppError::NotFound("User not found").to_string(), "User not found");
        assert_eq!(
            AppError::Validation("limit must be between 1 and 1000".to_string()).to_string(),
            "limit must be between 1 and 1000"
        );
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(status_of(AppError::NotFound("User not found")), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(AppError::Validation("bad".to_string())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(AppError::Database(RepositoryError::NotFound)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_tool_errors_split_by_blame() {
        assert_eq!(
            status_of(ToolError::UnknownAnalysis("x".to_string()).into()),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(ToolError::Repository(RepositoryError::NotFound).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
