//! Connection pool construction.

use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Bounds for the shared connection pool.
#[derive(Debug, Clone)]
pub struct PoolSettings {
    /// Maximum open connections.
    pub max_connections: u32,
    /// Connections kept warm while idle.
    pub min_connections: u32,
    /// Idle connections above the floor are closed after this long.
    pub idle_timeout: Duration,
    /// Bound on waiting for a connection, including the initial connect.
    pub acquire_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 25,
            min_connections: 5,
            idle_timeout: Duration::from_secs(15 * 60),
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

/// Opens the pool and establishes the first connection, failing if the
/// database is unreachable within `acquire_timeout`.
///
/// # Errors
///
/// Returns `sqlx::Error` if the URL is invalid or no connection can be made.
pub async fn connect(database_url: &str, settings: &PoolSettings) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections.min(settings.max_connections))
        .idle_timeout(Some(settings.idle_timeout))
        .acquire_timeout(settings.acquire_timeout)
        .connect(database_url)
        .await
}
