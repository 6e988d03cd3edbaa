//! Liveness reporting for the store and the cache

use crate::cache::{CacheBackend, CacheService, TaskCache};
use crate::observability::{Component, OperationEvent, OperationOutcome, SharedObserver};
use crate::repository::HealthRepository;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    Healthy,
    Unhealthy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentHealth {
    Healthy,
    Unhealthy,
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: HealthState,
    pub database: ComponentHealth,
    pub cache: ComponentHealth,
    pub timestamp: DateTime<Utc>,
    pub duration_ms: u64,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status == HealthState::Healthy
    }
}

/// Reports overall health. The database decides the overall status; an
/// unreachable cache is reported but only degrades performance.
pub struct HealthService<H, S = CacheBackend> {
    database: H,
    cache: Arc<TaskCache<S>>,
    observer: SharedObserver,
}

impl<H: HealthRepository, S: CacheService> HealthService<H, S> {
    pub fn new(database: H, cache: Arc<TaskCache<S>>, observer: SharedObserver) -> Self {
        Self {
            database,
            cache,
            observer,
        }
    }

    /// Never fails; problems are reported in the returned status
    pub async fn health(&self) -> HealthStatus {
        let started = Instant::now();

        let database_result = self.database.health_check().await;
        let database = match &database_result {
            Ok(()) => ComponentHealth::Healthy,
            Err(_) => ComponentHealth::Unhealthy,
        };

        let cache = if !self.cache.is_enabled() {
            ComponentHealth::Disabled
        } else if self.cache.ping().await.is_ok() {
            ComponentHealth::Healthy
        } else {
            ComponentHealth::Unhealthy
        };

        let status = if database == ComponentHealth::Healthy {
            HealthState::Healthy
        } else {
            HealthState::Unhealthy
        };

        let duration = started.elapsed();
        let outcome = match database_result {
            Ok(()) => OperationOutcome::Success,
            Err(e) => OperationOutcome::failed(
                Some(e.kind()),
                e.detail().map_or_else(|| e.to_string(), str::to_string),
            ),
        };
        self.observer.record(&OperationEvent::new(
            Component::Service,
            "health",
            duration,
            outcome,
        ));

        HealthStatus {
            status,
            database,
            cache,
            timestamp: Utc::now(),
            duration_ms: duration.as_millis() as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCacheService;
    use crate::error::{RepositoryError, RepositoryResult};
    use crate::observability::NullObserver;
    use async_trait::async_trait;
    use std::time::Duration;

    struct StaticHealth(bool);

    #[async_trait]
    impl HealthRepository for StaticHealth {
        async fn health_check(&self) -> RepositoryResult<()> {
            if self.0 {
                Ok(())
            } else {
                Err(RepositoryError::connection("health_check", "refused"))
            }
        }
    }

    fn memory_cache() -> Arc<TaskCache<MemoryCacheService>> {
        Arc::new(TaskCache::from_shards(
            vec![MemoryCacheService::new()],
            Duration::from_secs(1),
            NullObserver::shared(),
        ))
    }

    #[tokio::test]
    async fn test_healthy_with_cache() {
        let service = HealthService::new(StaticHealth(true), memory_cache(), NullObserver::shared());
        let status = service.health().await;

        assert!(status.is_healthy());
        assert_eq!(status.database, ComponentHealth::Healthy);
        assert_eq!(status.cache, ComponentHealth::Healthy);
    }

    #[tokio::test]
    async fn test_database_down_is_unhealthy() {
        let cache: Arc<TaskCache<MemoryCacheService>> =
            Arc::new(TaskCache::disabled(NullObserver::shared()));
        let service = HealthService::new(StaticHealth(false), cache, NullObserver::shared());
        let status = service.health().await;

        assert_eq!(status.status, HealthState::Unhealthy);
        assert_eq!(status.database, ComponentHealth::Unhealthy);
        assert_eq!(status.cache, ComponentHealth::Disabled);
    }

    #[tokio::test]
    async fn test_closed_cache_degrades_but_stays_healthy() {
        let cache = memory_cache();
        cache.close();
        let service = HealthService::new(StaticHealth(true), cache, NullObserver::shared());
        let status = service.health().await;

        assert!(status.is_healthy());
        assert_eq!(status.cache, ComponentHealth::Unhealthy);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let status = HealthStatus {
            status: HealthState::Healthy,
            database: ComponentHealth::Healthy,
            cache: ComponentHealth::Disabled,
            timestamp: Utc::now(),
            duration_ms: 3,
        };
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["cache"], "disabled");
        assert_eq!(json["duration_ms"], 3);
    }
}
