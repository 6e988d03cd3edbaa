//! # Store Bootstrap
//!
//! Wires the database pool, the sharded cache, the repositories and the
//! services into one [`StoreContext`].
//!
//! Startup order:
//!
//! 1. Validate configuration
//! 2. Connect to PostgreSQL, retrying with a fixed delay
//! 3. Apply embedded migrations when `database.run_migrations` is set
//! 4. Connect every cache shard (an enabled but unreachable cache fails startup)
//! 5. Wrap the store adapter in the cache-aside decorator when caching is on

use crate::cache::TaskCache;
use crate::config::StoreConfig;
use crate::database::DatabaseConnection;
use crate::error::StoreResult;
use crate::observability::SharedObserver;
use crate::repository::{CachedTaskRepository, PgHealthRepository, PgTaskRepository, TaskRepository};
use crate::services::{HealthService, TaskService};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{error, info};

pub type SharedTaskRepository = Arc<dyn TaskRepository>;

/// Everything a transport adapter needs to serve requests
pub struct StoreContext {
    config: StoreConfig,
    database: DatabaseConnection,
    cache: Arc<TaskCache>,
    repository: SharedTaskRepository,
    task_service: TaskService<SharedTaskRepository>,
    health_service: HealthService<PgHealthRepository>,
}

impl std::fmt::Debug for StoreContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreContext")
            .field("config", &self.config.sanitized())
            .field("cache", &self.cache)
            .finish()
    }
}

impl StoreContext {
    pub async fn initialize(config: &StoreConfig, observer: SharedObserver) -> StoreResult<Self> {
        config.validate()?;

        info!(config = %config.sanitized(), "Initializing task store");

        let database = DatabaseConnection::connect_with_retry(&config.database).await?;

        if config.database.run_migrations {
            if let Err(e) = database.run_migrations().await {
                error!(error = %e, "Database migrations failed");
                database.close().await;
                return Err(e.into());
            }
        }

        Self::from_database(database, config, observer).await
    }

    /// Build over an existing pool, skipping connection retry and migrations
    pub async fn from_pool(
        pool: PgPool,
        config: &StoreConfig,
        observer: SharedObserver,
    ) -> StoreResult<Self> {
        config.validate()?;
        Self::from_database(DatabaseConnection::from_pool(pool), config, observer).await
    }

    async fn from_database(
        database: DatabaseConnection,
        config: &StoreConfig,
        observer: SharedObserver,
    ) -> StoreResult<Self> {
        let cache = match TaskCache::connect(&config.cache, observer.clone()).await {
            Ok(cache) => Arc::new(cache),
            Err(e) => {
                error!(error = %e, "Cache startup failed");
                database.close().await;
                return Err(e.into());
            }
        };

        let store = PgTaskRepository::new(database.pool().clone(), observer.clone())
            .with_statement_timeout(config.database.statement_timeout())
            .with_slow_threshold(config.database.slow_query_threshold());

        let repository: SharedTaskRepository = if cache.is_enabled() {
            Arc::new(
                CachedTaskRepository::new(store, Arc::clone(&cache), observer.clone())
                    .with_config(&config.cache),
            )
        } else {
            Arc::new(store)
        };

        let task_service = TaskService::new(Arc::clone(&repository), observer.clone());
        let health_service = HealthService::new(
            PgHealthRepository::new(database.pool().clone(), config.database.statement_timeout()),
            Arc::clone(&cache),
            observer,
        );

        info!(
            cache_enabled = cache.is_enabled(),
            cache_shards = cache.shard_count(),
            "Task store ready"
        );

        Ok(Self {
            config: config.clone(),
            database,
            cache,
            repository,
            task_service,
            health_service,
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn pool(&self) -> &PgPool {
        self.database.pool()
    }

    pub fn cache(&self) -> &Arc<TaskCache> {
        &self.cache
    }

    pub fn repository(&self) -> &SharedTaskRepository {
        &self.repository
    }

    pub fn task_service(&self) -> &TaskService<SharedTaskRepository> {
        &self.task_service
    }

    pub fn health_service(&self) -> &HealthService<PgHealthRepository> {
        &self.health_service
    }

    /// Release cache shards, then the database pool
    pub async fn shutdown(&self) {
        self.cache.close();
        self.database.close().await;
        info!("Task store shut down");
    }
}
