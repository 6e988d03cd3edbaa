//! Cache-aside decorator
//!
//! Reads try the cache first and fall back to the wrapped repository. Writes go
//! to the wrapped repository first; the cache is then overwritten or invalidated
//! on a best-effort basis. A cache failure never fails, retries or delays the
//! repository operation beyond its own deadline.

use super::TaskRepository;
use crate::cache::{BestEffort, CacheBackend, CacheLookup, CacheService, TaskCache};
use crate::config::CacheConfig;
use crate::error::RepositoryResult;
use crate::models::{NewTask, Task};
use crate::observability::SharedObserver;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

pub const DEFAULT_ENTITY_TTL: Duration = Duration::from_secs(300);
pub const DEFAULT_LIST_TTL: Duration = Duration::from_secs(60);

pub struct CachedTaskRepository<R, S = CacheBackend> {
    inner: R,
    cache: Arc<TaskCache<S>>,
    entity_ttl: Duration,
    list_ttl: Duration,
    observer: SharedObserver,
}

impl<R, S> std::fmt::Debug for CachedTaskRepository<R, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedTaskRepository")
            .field("cache", &self.cache)
            .field("entity_ttl", &self.entity_ttl)
            .field("list_ttl", &self.list_ttl)
            .finish()
    }
}

impl<R: TaskRepository, S: CacheService> CachedTaskRepository<R, S> {
    pub fn new(inner: R, cache: Arc<TaskCache<S>>, observer: SharedObserver) -> Self {
        Self {
            inner,
            cache,
            entity_ttl: DEFAULT_ENTITY_TTL,
            list_ttl: DEFAULT_LIST_TTL,
            observer,
        }
    }

    pub fn with_ttls(mut self, entity_ttl: Duration, list_ttl: Duration) -> Self {
        self.entity_ttl = entity_ttl;
        self.list_ttl = list_ttl;
        self
    }

    pub fn with_config(self, config: &CacheConfig) -> Self {
        self.with_ttls(config.entity_ttl(), config.list_ttl())
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }

    pub fn cache(&self) -> &Arc<TaskCache<S>> {
        &self.cache
    }

    async fn remember(&self, task: &Task) {
        let _ = BestEffort::new(self.cache.set_task(task, self.entity_ttl).await).swallow(
            self.observer.as_ref(),
            "cache_set_task",
            Some(task.id),
        );
    }

    async fn forget_list(&self, entity_id: Option<Uuid>) {
        let _ = BestEffort::new(self.cache.invalidate_task_list().await).swallow(
            self.observer.as_ref(),
            "cache_invalidate_task_list",
            entity_id,
        );
    }
}

#[async_trait]
impl<R, S> TaskRepository for CachedTaskRepository<R, S>
where
    R: TaskRepository,
    S: CacheService + 'static,
{
    async fn create(&self, new_task: NewTask) -> RepositoryResult<Task> {
        let task = self.inner.create(new_task).await?;

        self.remember(&task).await;
        self.forget_list(Some(task.id)).await;

        Ok(task)
    }

    async fn get_by_id(&self, id: Uuid) -> RepositoryResult<Task> {
        let cached = BestEffort::new(self.cache.get_task(id).await).swallow(
            self.observer.as_ref(),
            "cache_get_task",
            Some(id),
        );
        if let Some(CacheLookup::Hit(task)) = cached {
            return Ok(task);
        }

        let task = self.inner.get_by_id(id).await?;
        self.remember(&task).await;

        Ok(task)
    }

    async fn update(&self, task: &Task) -> RepositoryResult<Task> {
        let updated = self.inner.update(task).await?;

        self.remember(&updated).await;
        self.forget_list(Some(updated.id)).await;

        Ok(updated)
    }

    async fn delete_by_id(&self, id: Uuid) -> RepositoryResult<()> {
        self.inner.delete_by_id(id).await?;

        let _ = BestEffort::new(self.cache.delete_task(id).await).swallow(
            self.observer.as_ref(),
            "cache_delete_task",
            Some(id),
        );
        self.forget_list(Some(id)).await;

        Ok(())
    }

    async fn list(&self) -> RepositoryResult<Vec<Task>> {
        let cached = BestEffort::new(self.cache.get_task_list().await).swallow(
            self.observer.as_ref(),
            "cache_get_task_list",
            None,
        );
        if let Some(CacheLookup::Hit(tasks)) = cached {
            return Ok(tasks);
        }

        let tasks = self.inner.list().await?;
        let _ = BestEffort::new(self.cache.set_task_list(&tasks, self.list_ttl).await).swallow(
            self.observer.as_ref(),
            "cache_set_task_list",
            None,
        );

        Ok(tasks)
    }
}
