//! PostgreSQL task store
//!
//! The only place driver errors are classified into [`RepositoryErrorKind`].
//! Every call runs under the configured statement deadline and is reported to
//! the observer with its duration.

use super::TaskRepository;
use crate::database::PgErrorCode;
use crate::error::{RepositoryError, RepositoryErrorKind, RepositoryResult};
use crate::models::{NewTask, Task};
use crate::observability::{
    Component, OperationEvent, OperationOutcome, SharedObserver, DEFAULT_SLOW_THRESHOLD,
};
use async_trait::async_trait;
use sqlx::error::{DatabaseError, ErrorKind};
use sqlx::PgPool;
use std::future::Future;
use std::time::{Duration, Instant};
use uuid::Uuid;

const TASK_COLUMNS: &str = "id, title, description, completed, created_at, updated_at";

/// Default per-call deadline
pub const DEFAULT_STATEMENT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct PgTaskRepository {
    pool: PgPool,
    statement_timeout: Duration,
    slow_threshold: Duration,
    observer: SharedObserver,
}

impl PgTaskRepository {
    pub fn new(pool: PgPool, observer: SharedObserver) -> Self {
        Self {
            pool,
            statement_timeout: DEFAULT_STATEMENT_TIMEOUT,
            slow_threshold: DEFAULT_SLOW_THRESHOLD,
            observer,
        }
    }

    pub fn with_statement_timeout(mut self, timeout: Duration) -> Self {
        self.statement_timeout = timeout;
        self
    }

    pub fn with_slow_threshold(mut self, threshold: Duration) -> Self {
        self.slow_threshold = threshold;
        self
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run a driver call under the deadline and classify its failure
    async fn execute<T>(
        &self,
        operation: &'static str,
        query: impl Future<Output = Result<T, sqlx::Error>> + Send,
    ) -> RepositoryResult<T> {
        match tokio::time::timeout(self.statement_timeout, query).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(classify_sqlx_error(operation, &e)),
            Err(_) => Err(RepositoryError::connection(
                operation,
                format!(
                    "deadline of {}ms exceeded",
                    self.statement_timeout.as_millis()
                ),
            )),
        }
    }

    fn observe<T>(
        &self,
        operation: &'static str,
        entity_id: Option<Uuid>,
        started: Instant,
        result: &RepositoryResult<T>,
    ) {
        let outcome = match result {
            Ok(_) => OperationOutcome::Success,
            Err(e) if e.is_not_found() => OperationOutcome::NotFound,
            Err(e) => OperationOutcome::failed(
                Some(e.kind()),
                e.detail().map_or_else(|| e.to_string(), str::to_string),
            ),
        };
        let event = OperationEvent::new(Component::Store, operation, started.elapsed(), outcome)
            .with_entity(entity_id)
            .with_slow_threshold(self.slow_threshold);
        self.observer.record(&event);
    }
}

#[async_trait]
impl TaskRepository for PgTaskRepository {
    async fn create(&self, new_task: NewTask) -> RepositoryResult<Task> {
        const OP: &str = "create_task";
        let started = Instant::now();

        let task = match Task::new(new_task) {
            Ok(task) => task,
            Err(e) => {
                let result = Err(RepositoryError::invalid_data(OP, e.to_string()));
                self.observe(OP, None, started, &result);
                return result;
            }
        };

        let sql = format!(
            "INSERT INTO tasks ({TASK_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6) RETURNING {TASK_COLUMNS}"
        );
        let result = self
            .execute(
                OP,
                sqlx::query_as::<_, Task>(&sql)
                    .bind(task.id)
                    .bind(&task.title)
                    .bind(&task.description)
                    .bind(task.completed)
                    .bind(task.created_at)
                    .bind(task.updated_at)
                    .fetch_one(&self.pool),
            )
            .await;

        self.observe(OP, Some(task.id), started, &result);
        result
    }

    async fn get_by_id(&self, id: Uuid) -> RepositoryResult<Task> {
        const OP: &str = "get_task_by_id";
        let started = Instant::now();

        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1");
        let result = self
            .execute(
                OP,
                sqlx::query_as::<_, Task>(&sql)
                    .bind(id)
                    .fetch_one(&self.pool),
            )
            .await;

        self.observe(OP, Some(id), started, &result);
        result
    }

    async fn update(&self, task: &Task) -> RepositoryResult<Task> {
        const OP: &str = "update_task";
        let started = Instant::now();

        // GREATEST keeps updated_at monotonic under clock skew between hosts
        let sql = format!(
            "UPDATE tasks \
             SET title = $2, description = $3, completed = $4, updated_at = GREATEST(NOW(), updated_at) \
             WHERE id = $1 \
             RETURNING {TASK_COLUMNS}"
        );
        let result = self
            .execute(
                OP,
                sqlx::query_as::<_, Task>(&sql)
                    .bind(task.id)
                    .bind(&task.title)
                    .bind(&task.description)
                    .bind(task.completed)
                    .fetch_one(&self.pool),
            )
            .await;

        self.observe(OP, Some(task.id), started, &result);
        result
    }

    async fn delete_by_id(&self, id: Uuid) -> RepositoryResult<()> {
        const OP: &str = "delete_task";
        let started = Instant::now();

        let result = self
            .execute(
                OP,
                sqlx::query("DELETE FROM tasks WHERE id = $1")
                    .bind(id)
                    .execute(&self.pool),
            )
            .await
            .and_then(|done| {
                if done.rows_affected() == 0 {
                    Err(RepositoryError::not_found(OP))
                } else {
                    Ok(())
                }
            });

        self.observe(OP, Some(id), started, &result);
        result
    }

    async fn list(&self) -> RepositoryResult<Vec<Task>> {
        const OP: &str = "list_tasks";
        let started = Instant::now();

        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks ORDER BY created_at DESC");
        let result = self
            .execute(OP, sqlx::query_as::<_, Task>(&sql).fetch_all(&self.pool))
            .await;

        self.observe(OP, None, started, &result);
        result
    }
}

/// Map a driver error onto the closed repository taxonomy
///
/// Database errors are classified by SQLSTATE class. The driver message is kept
/// as internal detail only.
pub fn classify_sqlx_error(operation: &'static str, error: &sqlx::Error) -> RepositoryError {
    let kind = match error {
        sqlx::Error::RowNotFound => RepositoryErrorKind::NotFound,
        sqlx::Error::Database(db) => classify_database_error(db.as_ref()),
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::Protocol(_)
        | sqlx::Error::WorkerCrashed => RepositoryErrorKind::ConnectionError,
        sqlx::Error::Encode(_) => RepositoryErrorKind::InvalidData,
        _ => RepositoryErrorKind::Internal,
    };

    let detail = match error {
        sqlx::Error::Database(db) => match db.code() {
            Some(code) => format!("[{}] {}", code, db.message()),
            None => db.message().to_string(),
        },
        other => other.to_string(),
    };

    RepositoryError::new(kind, operation).with_detail(detail)
}

fn classify_database_error(db: &dyn DatabaseError) -> RepositoryErrorKind {
    match db.kind() {
        ErrorKind::UniqueViolation => return RepositoryErrorKind::AlreadyExists,
        ErrorKind::ForeignKeyViolation | ErrorKind::NotNullViolation | ErrorKind::CheckViolation => {
            return RepositoryErrorKind::ConstraintViolation
        }
        _ => {}
    }

    match db.code().as_deref() {
        Some(code) if PgErrorCode::is_unique_violation(code) => RepositoryErrorKind::AlreadyExists,
        Some(code) if PgErrorCode::is_integrity_constraint_violation(code) => {
            RepositoryErrorKind::ConstraintViolation
        }
        Some(code) if PgErrorCode::is_connection_exception(code) => {
            RepositoryErrorKind::ConnectionError
        }
        Some(code) if PgErrorCode::is_data_exception(code) => RepositoryErrorKind::InvalidData,
        _ => RepositoryErrorKind::Internal,
    }
}
