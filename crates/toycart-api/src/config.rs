//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DATABASE_URL` - `PostgreSQL` connection string
//! - `TOKEN_SECRET` - HS256 key for bearer verification (min 32 chars)
//!
//! ## Optional
//! - `HOST` / `PORT` - Bind address (default: 0.0.0.0:5000)
//! - `DB_MAX_CONNECTIONS` (25), `DB_MIN_CONNECTIONS` (5),
//!   `DB_IDLE_TIMEOUT_SECS` (900), `DB_ACQUIRE_TIMEOUT_SECS` (5)
//! - `STORE_OPERATION_TIMEOUT_MS` - Bound on each store operation (3000)
//! - `ENTITLEMENT_SERVICE_URL` (<http://localhost:3000>), `ENTITLEMENT_TIMEOUT_MS` (2000)
//! - `CATALOG_SERVICE_URL` (<http://localhost:9000>), `CATALOG_TIMEOUT_MS` (2000),
//!   `CATALOG_MAX_RETRIES` (3)
//! - `LOG_FORMAT` - `json` or `compact` (json)
//! - `OTEL_EXPORTER_OTLP_ENDPOINT` - Enables OTLP trace export when set
//! - `OTEL_SERVICE_NAME` - Resource service name (toycart-api)

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use toycart_store::PoolSettings;

const MIN_TOKEN_SECRET_LENGTH: usize = 32;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Structured JSON logs.
    Json,
    /// Compact, human-readable logs.
    Compact,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "compact" => Ok(Self::Compact),
            other => Err(format!("expected json or compact, got {other}")),
        }
    }
}

/// Logging and trace export settings.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Log output format.
    pub log_format: LogFormat,
    /// OTLP gRPC endpoint; export is disabled when absent.
    pub otlp_endpoint: Option<String>,
    /// Service name attached to exported spans.
    pub service_name: String,
}

/// Entitlement service endpoint.
#[derive(Debug, Clone)]
pub struct EntitlementConfig {
    /// Base URL.
    pub base_url: String,
    /// Bound on each call.
    pub timeout: Duration,
}

/// Catalog service endpoint and retry budget.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Base URL.
    pub base_url: String,
    /// Bound on each attempt.
    pub attempt_timeout: Duration,
    /// Total attempts per lookup.
    pub max_retries: u32,
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `PostgreSQL` connection URL (may contain a password).
    pub database_url: SecretString,
    /// IP address to bind the server to.
    pub host: IpAddr,
    /// Port to listen on.
    pub port: u16,
    /// Bearer token signing key.
    pub token_secret: SecretString,
    /// Connection pool bounds.
    pub pool: PoolSettings,
    /// Bound on each store operation.
    pub store_operation_timeout: Duration,
    /// Entitlement service.
    pub entitlement: EntitlementConfig,
    /// Catalog service.
    pub catalog: CatalogConfig,
    /// Logging and tracing.
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is fine.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to
    /// its value.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let database_url = SecretString::from(env.required("DATABASE_URL")?);
        let token_secret = SecretString::from(env.required("TOKEN_SECRET")?);
        validate_token_secret(&token_secret, "TOKEN_SECRET")?;

        let defaults = PoolSettings::default();
        let pool = PoolSettings {
            max_connections: env.parsed("DB_MAX_CONNECTIONS", defaults.max_connections)?,
            min_connections: env.parsed("DB_MIN_CONNECTIONS", defaults.min_connections)?,
            idle_timeout: Duration::from_secs(
                env.parsed("DB_IDLE_TIMEOUT_SECS", defaults.idle_timeout.as_secs())?,
            ),
            acquire_timeout: Duration::from_secs(
                env.parsed("DB_ACQUIRE_TIMEOUT_SECS", defaults.acquire_timeout.as_secs())?,
            ),
        };

        Ok(Self {
            database_url,
            host: env.parsed("HOST", IpAddr::from([0, 0, 0, 0]))?,
            port: env.parsed("PORT", 5000)?,
            token_secret,
            pool,
            store_operation_timeout: Duration::from_millis(
                env.parsed("STORE_OPERATION_TIMEOUT_MS", 3000)?,
            ),
            entitlement: EntitlementConfig {
                base_url: env.or_default("ENTITLEMENT_SERVICE_URL", "http://localhost:3000"),
                timeout: Duration::from_millis(env.parsed("ENTITLEMENT_TIMEOUT_MS", 2000)?),
            },
            catalog: CatalogConfig {
                base_url: env.or_default("CATALOG_SERVICE_URL", "http://localhost:9000"),
                attempt_timeout: Duration::from_millis(env.parsed("CATALOG_TIMEOUT_MS", 2000)?),
                max_retries: env.parsed("CATALOG_MAX_RETRIES", 3)?,
            },
            telemetry: TelemetryConfig {
                log_format: env.parsed("LOG_FORMAT", LogFormat::Json)?,
                otlp_endpoint: env.optional("OTEL_EXPORTER_OTLP_ENDPOINT"),
                service_name: env.or_default("OTEL_SERVICE_NAME", "toycart-api"),
            },
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<'a, F: Fn(&str) -> Option<String>>(&'a F);

impl<F: Fn(&str) -> Option<String>> Env<'_, F> {
    /// Set and non-empty, or `None`.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    fn parsed<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.optional(key) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
            None => Ok(default),
        }
    }
}

/// Validate that a signing secret meets minimum length requirements.
fn validate_token_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_TOKEN_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_TOKEN_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}
