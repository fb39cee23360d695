//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `API_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `API_HOST` - Bind address (default: 127.0.0.1)
//! - `API_PORT` - Listen port (default: 8000)
//! - `DB_MAX_CONNECTIONS` - Pool size (default: 10)
//! - `CORS_ALLOW_ANY` - Allow any origin, method and header (default: true)
//! - `LOG_FORMAT` - `json` for structured logs, anything else for text
//! - `COGS_PERCENTAGE` - Cost of goods sold as a share of revenue (default: 0.60)
//! - `OPERATIONAL_COST_PERCENTAGE` - Operating costs as a share of revenue (default: 0.25)
//! - `CUSTOMER_ACQUISITION_COST` - Flat cost per acquired customer (default: 15.0)
//! - `RETURN_RATE` - Expected share of orders returned (default: 0.05)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 1.0)

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use secrecy::SecretString;
use serde::Serialize;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// API application configuration.
///
/// Implements `Debug` manually to redact the database URL.
#[derive(Clone)]
pub struct ApiConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Maximum pooled database connections
    pub db_max_connections: u32,
    /// Whether CORS allows every origin
    pub cors_allow_any: bool,
    /// Emit JSON logs instead of human-readable text
    pub json_logs: bool,
    /// Assumptions used by the financial analysis tools
    pub cost_assumptions: CostAssumptions,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate
    pub sentry_traces_sample_rate: f32,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("database_url", &"[REDACTED]")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("db_max_connections", &self.db_max_connections)
            .field("cors_allow_any", &self.cors_allow_any)
            .field("json_logs", &self.json_logs)
            .field("cost_assumptions", &self.cost_assumptions)
            .field("sentry_dsn", &self.sentry_dsn.as_ref().map(|_| "[REDACTED]"))
            .field("sentry_environment", &self.sentry_environment)
            .finish_non_exhaustive()
    }
}

/// Cost model applied to revenue when estimating profit.
///
/// Serialized verbatim into profit reports so readers can see what was assumed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CostAssumptions {
    /// Share of revenue spent on goods sold.
    #[serde(rename = "cost_of_goods_sold_percentage")]
    pub cogs_percentage: f64,
    /// Share of revenue spent on operations.
    pub operational_cost_percentage: f64,
    /// Flat cost of acquiring one customer.
    pub customer_acquisition_cost: f64,
    /// Share of orders expected to be returned.
    pub return_rate: f64,
}

impl Default for CostAssumptions {
    fn default() -> Self {
        Self {
            cogs_percentage: 0.60,
            operational_cost_percentage: 0.25,
            customer_acquisition_cost: 15.0,
            return_rate: 0.05,
        }
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("API_DATABASE_URL")?;
        let host: IpAddr = parse_env_or_default("API_HOST", "127.0.0.1")?;
        let port: u16 = parse_env_or_default("API_PORT", "8000")?;
        let db_max_connections: u32 = parse_env_or_default("DB_MAX_CONNECTIONS", "10")?;
        let cors_allow_any: bool = parse_env_or_default("CORS_ALLOW_ANY", "true")?;
        let json_logs = get_optional_env("LOG_FORMAT").is_some_and(|v| v.eq_ignore_ascii_case("json"));
        let cost_assumptions = CostAssumptions::from_env()?;

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            database_url,
            host,
            port,
            db_max_connections,
            cors_allow_any,
            json_logs,
            cost_assumptions,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl CostAssumptions {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let assumptions = Self {
            cogs_percentage: parse_optional_env("COGS_PERCENTAGE")?
                .unwrap_or(defaults.cogs_percentage),
            operational_cost_percentage: parse_optional_env("OPERATIONAL_COST_PERCENTAGE")?
                .unwrap_or(defaults.operational_cost_percentage),
            customer_acquisition_cost: parse_optional_env("CUSTOMER_ACQUISITION_COST")?
                .unwrap_or(defaults.customer_acquisition_cost),
            return_rate: parse_optional_env("RETURN_RATE")?.unwrap_or(defaults.return_rate),
        };
        assumptions.validate()?;
        Ok(assumptions)
    }

    /// Reject shares outside `0.0..=1.0` and negative acquisition costs.
    fn validate(&self) -> Result<(), ConfigError> {
        let shares = [
            ("COGS_PERCENTAGE", self.cogs_percentage),
            ("OPERATIONAL_COST_PERCENTAGE", self.operational_cost_percentage),
            ("RETURN_RATE", self.return_rate),
        ];
        for (key, value) in shares {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidEnvVar(
                    key.to_string(),
                    format!("must be between 0 and 1 (got {value})"),
                ));
            }
        }
        if self.customer_acquisition_cost < 0.0 {
            return Err(ConfigError::InvalidEnvVar(
                "CUSTOMER_ACQUISITION_COST".to_string(),
                "must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env_or_default<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse an optional environment variable; unset yields `None`.
fn parse_optional_env<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
        .transpose()
}
