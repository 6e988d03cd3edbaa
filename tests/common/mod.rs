//! Shared helpers for integration tests that run without external services

#![allow(dead_code)]

use async_trait::async_trait;
use checklist_store::cache::{
    CacheError, CacheResult, CacheService, MemoryCacheService, TaskCache,
};
use checklist_store::error::{RepositoryError, RepositoryErrorKind, RepositoryResult};
use checklist_store::models::{NewTask, Task};
use checklist_store::observability::{
    Component, OperationEvent, OperationObserver, OperationOutcome, SharedObserver,
};
use checklist_store::repository::{CachedTaskRepository, TaskRepository};
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// In-process stand-in for the PostgreSQL adapter with call counters
#[derive(Debug, Default)]
pub struct InMemoryTaskRepository {
    tasks: Mutex<HashMap<Uuid, Task>>,
    pub creates: AtomicUsize,
    pub gets: AtomicUsize,
    pub updates: AtomicUsize,
    pub deletes: AtomicUsize,
    pub lists: AtomicUsize,
}

impl InMemoryTaskRepository {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn get_calls(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn list_calls(&self) -> usize {
        self.lists.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.tasks.lock().len()
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn create(&self, new_task: NewTask) -> RepositoryResult<Task> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        let task = Task::new(new_task)
            .map_err(|e| RepositoryError::invalid_data("create_task", e.to_string()))?;

        let mut tasks = self.tasks.lock();
        if tasks.contains_key(&task.id) {
            return Err(RepositoryError::new(
                RepositoryErrorKind::AlreadyExists,
                "create_task",
            ));
        }
        tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn get_by_id(&self, id: Uuid) -> RepositoryResult<Task> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.tasks
            .lock()
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found("get_task_by_id"))
    }

    async fn update(&self, task: &Task) -> RepositoryResult<Task> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        let mut tasks = self.tasks.lock();
        let stored = tasks
            .get_mut(&task.id)
            .ok_or_else(|| RepositoryError::not_found("update_task"))?;

        stored.title = task.title.clone();
        stored.description = task.description.clone();
        stored.completed = task.completed;
        stored.updated_at = Utc::now().max(stored.updated_at);
        Ok(stored.clone())
    }

    async fn delete_by_id(&self, id: Uuid) -> RepositoryResult<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.tasks
            .lock()
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::not_found("delete_task"))
    }

    async fn list(&self) -> RepositoryResult<Vec<Task>> {
        self.lists.fetch_add(1, Ordering::SeqCst);
        let mut tasks: Vec<Task> = self.tasks.lock().values().cloned().collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tasks)
    }
}

/// Repository whose every call fails with one kind
#[derive(Debug)]
pub struct FailingTaskRepository(pub RepositoryErrorKind);

#[async_trait]
impl TaskRepository for FailingTaskRepository {
    async fn create(&self, _new_task: NewTask) -> RepositoryResult<Task> {
        Err(RepositoryError::new(self.0, "create_task"))
    }

    async fn get_by_id(&self, _id: Uuid) -> RepositoryResult<Task> {
        Err(RepositoryError::new(self.0, "get_task_by_id"))
    }

    async fn update(&self, _task: &Task) -> RepositoryResult<Task> {
        Err(RepositoryError::new(self.0, "update_task"))
    }

    async fn delete_by_id(&self, _id: Uuid) -> RepositoryResult<()> {
        Err(RepositoryError::new(self.0, "delete_task"))
    }

    async fn list(&self) -> RepositoryResult<Vec<Task>> {
        Err(RepositoryError::new(self.0, "list_tasks"))
    }
}

/// Observer that keeps every event for assertions
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<OperationEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<OperationEvent> {
        self.events.lock().clone()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }

    pub fn swallowed(&self) -> Vec<OperationEvent> {
        self.events()
            .into_iter()
            .filter(|e| matches!(e.outcome, OperationOutcome::Swallowed { .. }))
            .collect()
    }

    pub fn count(&self, component: Component, outcome: &str) -> usize {
        self.events()
            .iter()
            .filter(|e| e.component == component && e.outcome.as_str() == outcome)
            .count()
    }
}

impl OperationObserver for RecordingObserver {
    fn record(&self, event: &OperationEvent) {
        self.events.lock().push(event.clone());
    }
}

/// Memory shard that can be switched into a failing state
#[derive(Debug, Clone, Default)]
pub struct FlakyCache {
    pub inner: MemoryCacheService,
    failing: Arc<AtomicBool>,
}

impl FlakyCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let cache = Self::default();
        cache.set_failing(true);
        cache
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> CacheResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(CacheError::BackendError("shard unavailable".to_string()))
        } else {
            Ok(())
        }
    }
}

impl CacheService for FlakyCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        self.check()?;
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        self.check()?;
        self.inner.set(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        self.check()?;
        self.inner.delete(key).await
    }

    async fn health_check(&self) -> CacheResult<bool> {
        self.check()?;
        Ok(true)
    }

    fn provider_name(&self) -> &'static str {
        "flaky"
    }
}

pub type TestCachedRepository =
    CachedTaskRepository<Arc<InMemoryTaskRepository>, FlakyCache>;

/// Wire an in-memory store behind a cache over `shards`
pub fn cached_repository(
    shards: Vec<FlakyCache>,
    observer: SharedObserver,
) -> (
    TestCachedRepository,
    Arc<InMemoryTaskRepository>,
    Arc<TaskCache<FlakyCache>>,
) {
    let store = InMemoryTaskRepository::new();
    let cache = Arc::new(TaskCache::from_shards(
        shards,
        Duration::from_secs(1),
        observer.clone(),
    ));
    let repository = CachedTaskRepository::new(Arc::clone(&store), Arc::clone(&cache), observer);
    (repository, store, cache)
}
