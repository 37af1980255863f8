//! Database connection pool management.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use tracing::warn;

/// Database configuration.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    /// Total connection attempts at startup, at least one.
    pub connect_attempts: u32,
    pub connect_retry_delay_secs: u64,
}

/// Creates a PostgreSQL connection pool with the given configuration.
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .connect(&config.url)
        .await
}

/// Creates the pool, retrying up to `connect_attempts` times.
///
/// Returns the last error once all attempts are used.
pub async fn create_pool_with_retry(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let attempts = config.connect_attempts.max(1);
    let delay = Duration::from_secs(config.connect_retry_delay_secs);
    let mut attempt = 1;

    loop {
        match create_pool(config).await {
            Ok(pool) => return Ok(pool),
            Err(err) if attempt < attempts => {
                warn!(
                    attempt,
                    attempts,
                    retry_in_secs = delay.as_secs(),
                    error = %err,
                    "Database connection failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
