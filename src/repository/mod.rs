//! # Task Repository
//!
//! The [`TaskRepository`] contract and its implementations:
//!
//! - [`PgTaskRepository`] - PostgreSQL store adapter, the source of truth
//! - [`CachedTaskRepository`] - cache-aside decorator over any repository
//! - [`PgHealthRepository`] - database liveness check
//!
//! Callers depend on the trait only; whether reads are served from cache is a
//! wiring decision made at startup.

pub mod cached;
pub mod health;
pub mod postgres;

pub use cached::CachedTaskRepository;
pub use health::{HealthRepository, PgHealthRepository};
pub use postgres::{classify_sqlx_error, PgTaskRepository};

use crate::error::RepositoryResult;
use crate::models::{NewTask, Task};
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

/// Storage operations on tasks
///
/// Every failure is a [`RepositoryError`](crate::error::RepositoryError) of a
/// closed kind. `NotFound` is an ordinary outcome, not an exceptional one.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Assign identity and timestamps, persist, and return the stored row
    async fn create(&self, new_task: NewTask) -> RepositoryResult<Task>;

    async fn get_by_id(&self, id: Uuid) -> RepositoryResult<Task>;

    /// Replace title, description and completion; the store refreshes `updated_at`
    async fn update(&self, task: &Task) -> RepositoryResult<Task>;

    /// Remove a task. Deleting an absent identity is `NotFound`.
    async fn delete_by_id(&self, id: Uuid) -> RepositoryResult<()>;

    /// Every task, newest first
    async fn list(&self) -> RepositoryResult<Vec<Task>>;
}

#[async_trait]
impl<T: TaskRepository + ?Sized> TaskRepository for Arc<T> {
    async fn create(&self, new_task: NewTask) -> RepositoryResult<Task> {
        (**self).create(new_task).await
    }

    async fn get_by_id(&self, id: Uuid) -> RepositoryResult<Task> {
        (**self).get_by_id(id).await
    }

    async fn update(&self, task: &Task) -> RepositoryResult<Task> {
        (**self).update(task).await
    }

    async fn delete_by_id(&self, id: Uuid) -> RepositoryResult<()> {
        (**self).delete_by_id(id).await
    }

    async fn list(&self) -> RepositoryResult<Vec<Task>> {
        (**self).list().await
    }
}
