//! Database liveness check

use crate::error::{RepositoryError, RepositoryResult};
use crate::repository::classify_sqlx_error;
use async_trait::async_trait;
use sqlx::PgPool;
use std::time::Duration;

#[async_trait]
pub trait HealthRepository: Send + Sync {
    /// Round-trip a trivial statement to the store
    async fn health_check(&self) -> RepositoryResult<()>;
}

#[derive(Debug, Clone)]
pub struct PgHealthRepository {
    pool: PgPool,
    timeout: Duration,
}

impl PgHealthRepository {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }
}

#[async_trait]
impl HealthRepository for PgHealthRepository {
    async fn health_check(&self) -> RepositoryResult<()> {
        const OP: &str = "health_check";

        let query = sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(&self.pool);
        match tokio::time::timeout(self.timeout, query).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(classify_sqlx_error(OP, &e)),
            Err(_) => Err(RepositoryError::connection(OP, "health check timed out")),
        }
    }
}
