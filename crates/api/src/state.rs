//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::agents::AgentCoordinator;
use crate::config::ApiConfig;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. The coordinator, and with it the query
/// history, is shared by every request.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    pool: PgPool,
    coordinator: AgentCoordinator,
}

impl AppState {
    /// Create application state with the default agents registered.
    #[must_use]
    pub fn new(config: ApiConfig, pool: PgPool) -> Self {
        let coordinator = AgentCoordinator::with_defaults(pool.clone(), config.cost_assumptions);
        Self::with_coordinator(config, pool, coordinator)
    }

    /// Create application state around an existing coordinator.
    #[must_use]
    pub fn with_coordinator(config: ApiConfig, pool: PgPool, coordinator: AgentCoordinator) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                coordinator,
            }),
        }
    }

    /// Get a reference to the API configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the agent coordinator.
    #[must_use]
    pub fn coordinator(&self) -> &AgentCoordinator {
        &self.inner.coordinator
    }
}
