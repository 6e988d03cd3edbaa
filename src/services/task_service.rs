use crate::error::{ServiceError, ServiceResult, StatusCategory};
use crate::models::{NewTask, Task, TaskUpdate};
use crate::observability::{Component, OperationEvent, OperationOutcome, SharedObserver};
use crate::repository::TaskRepository;
use std::time::Instant;
use uuid::Uuid;

/// Task use cases over any [`TaskRepository`]
#[derive(Debug, Clone)]
pub struct TaskService<R> {
    repository: R,
    observer: SharedObserver,
}

impl<R: TaskRepository> TaskService<R> {
    pub fn new(repository: R, observer: SharedObserver) -> Self {
        Self {
            repository,
            observer,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub async fn create_task(
        &self,
        title: &str,
        description: Option<String>,
    ) -> ServiceResult<Task> {
        let started = Instant::now();

        let result = if title.trim().is_empty() {
            Err(ServiceError::title_required())
        } else {
            let new_task = NewTask {
                title: title.to_string(),
                description,
            };
            self.repository
                .create(new_task)
                .await
                .map_err(ServiceError::from)
        };

        self.observe(
            "create_task",
            result.as_ref().ok().map(|t| t.id),
            started,
            &result,
        );
        result
    }

    pub async fn get_task(&self, id: &str) -> ServiceResult<Task> {
        let started = Instant::now();

        let (entity_id, result) = match parse_task_id(id) {
            Ok(id) => (
                Some(id),
                self.repository
                    .get_by_id(id)
                    .await
                    .map_err(ServiceError::from),
            ),
            Err(e) => (None, Err(e)),
        };

        self.observe("get_task", entity_id, started, &result);
        result
    }

    /// Read, apply the partial update, write back
    pub async fn update_task(&self, id: &str, update: TaskUpdate) -> ServiceResult<Task> {
        let started = Instant::now();

        let (entity_id, result) = match parse_task_id(id) {
            Ok(id) => (Some(id), self.apply_update(id, update).await),
            Err(e) => (None, Err(e)),
        };

        self.observe("update_task", entity_id, started, &result);
        result
    }

    pub async fn delete_task(&self, id: &str) -> ServiceResult<()> {
        let started = Instant::now();

        let (entity_id, result) = match parse_task_id(id) {
            Ok(id) => (
                Some(id),
                self.repository
                    .delete_by_id(id)
                    .await
                    .map_err(ServiceError::from),
            ),
            Err(e) => (None, Err(e)),
        };

        self.observe("delete_task", entity_id, started, &result);
        result
    }

    pub async fn list_tasks(&self) -> ServiceResult<Vec<Task>> {
        let started = Instant::now();

        let result = self.repository.list().await.map_err(ServiceError::from);

        self.observe("list_tasks", None, started, &result);
        result
    }

    async fn apply_update(&self, id: Uuid, update: TaskUpdate) -> ServiceResult<Task> {
        let mut task = self.repository.get_by_id(id).await?;
        task.apply(update)
            .map_err(|_| ServiceError::title_required())?;
        Ok(self.repository.update(&task).await?)
    }

    fn observe<T>(
        &self,
        operation: &'static str,
        entity_id: Option<Uuid>,
        started: Instant,
        result: &ServiceResult<T>,
    ) {
        let outcome = match result {
            Ok(_) => OperationOutcome::Success,
            Err(e) if e.category == StatusCategory::NotFound => OperationOutcome::NotFound,
            Err(e) => OperationOutcome::failed(None, e.message.clone()),
        };
        let event = OperationEvent::new(Component::Service, operation, started.elapsed(), outcome)
            .with_entity(entity_id);
        self.observer.record(&event);
    }
}

fn parse_task_id(id: &str) -> ServiceResult<Uuid> {
    Uuid::parse_str(id.trim()).map_err(|_| ServiceError::invalid_task_id())
}
