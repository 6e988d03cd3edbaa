use crate::config::{redact_url, DatabaseConfig};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use tracing::{info, warn};

/// Embedded schema migrations (`./migrations`)
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Owned PostgreSQL pool for the task store
#[derive(Debug, Clone)]
pub struct DatabaseConnection {
    pool: PgPool,
}

impl DatabaseConnection {
    /// Open a pool once, without retry
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.pool.max_connections)
            .min_connections(config.pool.min_connections)
            .acquire_timeout(Duration::from_secs(config.pool.acquire_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.pool.idle_timeout_seconds))
            .max_lifetime(Duration::from_secs(config.pool.max_lifetime_seconds))
            .test_before_acquire(true)
            .connect(&config.url)
            .await?;

        Ok(Self { pool })
    }

    /// Open a pool, retrying with a fixed delay
    ///
    /// Makes `connect_retry_attempts` attempts `connect_retry_delay_ms` apart and
    /// returns the last error once they are exhausted.
    pub async fn connect_with_retry(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let attempts = config.connect_retry_attempts.max(1);
        let delay = config.connect_retry_delay();
        let url = redact_url(&config.url);
        let mut attempt = 1;

        loop {
            match Self::connect(config).await {
                Ok(connection) => {
                    info!(url = %url, attempt = attempt, "Connected to database");
                    return Ok(connection);
                }
                Err(e) if attempt < attempts => {
                    warn!(
                        url = %url,
                        attempt = attempt,
                        max_attempts = attempts,
                        retry_in_ms = delay.as_millis() as u64,
                        error = %e,
                        "Database connection failed, retrying"
                    );
                    attempt += 1;
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    warn!(
                        url = %url,
                        max_attempts = attempts,
                        error = %e,
                        "Database connection failed, giving up"
                    );
                    return Err(e);
                }
            }
        }
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply pending embedded migrations
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        MIGRATOR.run(&self.pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
