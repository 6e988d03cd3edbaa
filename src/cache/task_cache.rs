//! Sharded task cache client
//!
//! Stores JSON snapshots of single tasks under `task:<uuid>` and of the full list
//! under `tasks:list`, spread over independent shards by [`ShardRouter`]. Each key
//! lives on exactly one shard; a failing shard is never retried elsewhere.

use super::errors::{CacheError, CacheResult};
use super::providers::CacheBackend;
use super::shard::ShardRouter;
use super::traits::CacheService;
use crate::config::{redact_url, CacheConfig};
use crate::models::Task;
use crate::observability::{
    Component, OperationEvent, OperationOutcome, SharedObserver, DEFAULT_SLOW_THRESHOLD,
};
use futures::future::try_join_all;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info};
use uuid::Uuid;

/// Key of the full-list snapshot
pub const TASK_LIST_KEY: &str = "tasks:list";

/// Key of a single task snapshot
pub fn task_key(id: Uuid) -> String {
    format!("task:{}", id)
}

/// Outcome of a successful cache read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup<T> {
    Hit(T),
    /// Key absent or expired
    Miss,
    /// Caching is turned off
    Disabled,
}

impl<T> CacheLookup<T> {
    pub fn is_hit(&self) -> bool {
        matches!(self, Self::Hit(_))
    }

    pub fn is_disabled(&self) -> bool {
        matches!(self, Self::Disabled)
    }

    pub fn into_hit(self) -> Option<T> {
        match self {
            Self::Hit(value) => Some(value),
            Self::Miss | Self::Disabled => None,
        }
    }
}

/// Sharded cache for task snapshots
///
/// When disabled every mutation is a successful no-op and every read reports
/// [`CacheLookup::Disabled`] without touching the network.
pub struct TaskCache<S = CacheBackend> {
    /// `None` once closed
    shards: RwLock<Option<Arc<Vec<S>>>>,
    router: ShardRouter,
    enabled: bool,
    operation_timeout: Duration,
    observer: SharedObserver,
}

impl<S> std::fmt::Debug for TaskCache<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskCache")
            .field("enabled", &self.enabled)
            .field("shard_count", &self.router.shard_count())
            .field("operation_timeout", &self.operation_timeout)
            .finish()
    }
}

impl TaskCache<CacheBackend> {
    /// Connect every configured shard
    ///
    /// Returns a disabled cache when caching is off or no endpoint is configured.
    /// Shards connect concurrently, each pinged under `connect_timeout`; any
    /// unreachable shard fails the whole call. Shard order follows the endpoint
    /// list.
    pub async fn connect(config: &CacheConfig, observer: SharedObserver) -> CacheResult<Self> {
        if !config.is_active() {
            info!(
                enabled = config.enabled,
                endpoints = config.endpoints.len(),
                "Task cache disabled"
            );
            return Ok(Self::disabled(observer));
        }

        let connects = config.endpoints.iter().enumerate().map(|(index, endpoint)| async move {
            CacheBackend::connect(
                endpoint,
                config.password.as_deref(),
                config.database,
                config.connect_timeout(),
            )
            .await
            .map_err(|e| {
                error!(
                    shard = index,
                    endpoint = %redact_url(endpoint),
                    error = %e,
                    "Failed to connect cache shard"
                );
                e
            })
        });
        let shards = try_join_all(connects).await?;

        info!(
            shards = shards.len(),
            entity_ttl_seconds = config.entity_ttl_seconds,
            list_ttl_seconds = config.list_ttl_seconds,
            "Task cache connected"
        );

        Ok(Self::from_shards(
            shards,
            config.operation_timeout(),
            observer,
        ))
    }
}

impl<S: CacheService> TaskCache<S> {
    pub fn disabled(observer: SharedObserver) -> Self {
        Self {
            shards: RwLock::new(None),
            router: ShardRouter::new(0),
            enabled: false,
            operation_timeout: Duration::ZERO,
            observer,
        }
    }

    /// Build over already connected shards. An empty list yields a disabled cache.
    pub fn from_shards(shards: Vec<S>, operation_timeout: Duration, observer: SharedObserver) -> Self {
        if shards.is_empty() {
            return Self::disabled(observer);
        }

        Self {
            router: ShardRouter::new(shards.len()),
            shards: RwLock::new(Some(Arc::new(shards))),
            enabled: true,
            operation_timeout,
            observer,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn shard_count(&self) -> usize {
        self.router.shard_count()
    }

    pub fn router(&self) -> ShardRouter {
        self.router
    }

    pub async fn set_task(&self, task: &Task, ttl: Duration) -> CacheResult<()> {
        if !self.enabled {
            return Ok(());
        }
        let value = serde_json::to_string(task)?;
        self.set_raw("cache_set_task", &task_key(task.id), Some(task.id), &value, ttl)
            .await
    }

    pub async fn get_task(&self, id: Uuid) -> CacheResult<CacheLookup<Task>> {
        self.get_decoded("cache_get_task", &task_key(id), Some(id))
            .await
    }

    pub async fn delete_task(&self, id: Uuid) -> CacheResult<()> {
        if !self.enabled {
            return Ok(());
        }
        self.delete_raw("cache_delete_task", &task_key(id), Some(id))
            .await
    }

    pub async fn set_task_list(&self, tasks: &[Task], ttl: Duration) -> CacheResult<()> {
        if !self.enabled {
            return Ok(());
        }
        let value = serde_json::to_string(tasks)?;
        self.set_raw("cache_set_task_list", TASK_LIST_KEY, None, &value, ttl)
            .await
    }

    pub async fn get_task_list(&self) -> CacheResult<CacheLookup<Vec<Task>>> {
        self.get_decoded("cache_get_task_list", TASK_LIST_KEY, None)
            .await
    }

    pub async fn invalidate_task_list(&self) -> CacheResult<()> {
        if !self.enabled {
            return Ok(());
        }
        self.delete_raw("cache_invalidate_task_list", TASK_LIST_KEY, None)
            .await
    }

    /// Check every shard in order, stopping at the first failure
    ///
    /// The error names the failing shard by index only.
    pub async fn ping(&self) -> CacheResult<()> {
        if !self.enabled {
            return Ok(());
        }
        let shards = self.shards()?;

        for (index, shard) in shards.iter().enumerate() {
            let started = Instant::now();
            let result = match self.with_deadline(shard.health_check()).await {
                Ok(true) => Ok(()),
                Ok(false) => Err(CacheError::ConnectionError(format!(
                    "shard {} returned an unexpected PING reply",
                    index
                ))),
                Err(e) => Err(CacheError::ConnectionError(format!(
                    "shard {} ping failed: {}",
                    index, e
                ))),
            };
            self.observe("cache_ping", None, index, started, outcome_of(&result));
            result?;
        }

        Ok(())
    }

    /// Release every shard. Later calls are no-ops.
    pub fn close(&self) {
        if let Some(shards) = self.shards.write().take() {
            info!(shards = shards.len(), "Task cache closed");
        }
    }

    /// Snapshot of the shard list; the lock is released before any await
    fn shards(&self) -> CacheResult<Arc<Vec<S>>> {
        self.shards
            .read()
            .as_ref()
            .map(Arc::clone)
            .ok_or_else(|| CacheError::ConnectionError("cache client is closed".to_string()))
    }

    async fn with_deadline<T>(
        &self,
        operation: impl Future<Output = CacheResult<T>>,
    ) -> CacheResult<T> {
        tokio::time::timeout(self.operation_timeout, operation)
            .await
            .map_err(|_| {
                CacheError::Timeout(format!(
                    "exceeded {}ms",
                    self.operation_timeout.as_millis()
                ))
            })?
    }

    async fn get_decoded<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        key: &str,
        entity_id: Option<Uuid>,
    ) -> CacheResult<CacheLookup<T>> {
        if !self.enabled {
            return Ok(CacheLookup::Disabled);
        }
        let shards = self.shards()?;
        let index = self.router.shard_index(key);
        let started = Instant::now();

        let result = match self.with_deadline(shards[index].get(key)).await {
            Ok(Some(raw)) => serde_json::from_str::<T>(&raw)
                .map(CacheLookup::Hit)
                .map_err(CacheError::from),
            Ok(None) => Ok(CacheLookup::Miss),
            Err(e) => Err(e),
        };

        let outcome = match &result {
            Ok(CacheLookup::Hit(_)) => OperationOutcome::CacheHit,
            Ok(_) => OperationOutcome::CacheMiss,
            Err(e) => OperationOutcome::failed(None, e.to_string()),
        };
        self.observe(operation, entity_id, index, started, outcome);

        result
    }

    async fn set_raw(
        &self,
        operation: &'static str,
        key: &str,
        entity_id: Option<Uuid>,
        value: &str,
        ttl: Duration,
    ) -> CacheResult<()> {
        let shards = self.shards()?;
        let index = self.router.shard_index(key);
        let started = Instant::now();

        let result = self.with_deadline(shards[index].set(key, value, ttl)).await;
        self.observe(operation, entity_id, index, started, outcome_of(&result));

        result
    }

    async fn delete_raw(
        &self,
        operation: &'static str,
        key: &str,
        entity_id: Option<Uuid>,
    ) -> CacheResult<()> {
        let shards = self.shards()?;
        let index = self.router.shard_index(key);
        let started = Instant::now();

        let result = self.with_deadline(shards[index].delete(key)).await;
        self.observe(operation, entity_id, index, started, outcome_of(&result));

        result
    }

    fn observe(
        &self,
        operation: &'static str,
        entity_id: Option<Uuid>,
        shard: usize,
        started: Instant,
        outcome: OperationOutcome,
    ) {
        let event = OperationEvent::new(Component::Cache, operation, started.elapsed(), outcome)
            .with_entity(entity_id)
            .with_shard(shard)
            .with_slow_threshold(DEFAULT_SLOW_THRESHOLD);
        self.observer.record(&event);
    }
}

fn outcome_of(result: &CacheResult<()>) -> OperationOutcome {
    match result {
        Ok(()) => OperationOutcome::Success,
        Err(e) => OperationOutcome::failed(None, e.to_string()),
    }
}
