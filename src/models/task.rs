//! # Task Model
//!
//! The `Task` record and its mutation rules.
//!
//! ## Database Schema
//!
//! Maps to the `tasks` table:
//! - `id`: Primary key (UUID, assigned at creation, never reassigned)
//! - `title`: Required, non-empty (TEXT)
//! - `description`: Optional (TEXT, nullable)
//! - `completed`: Completion flag (BOOLEAN, default false)
//! - `created_at`: Set once (TIMESTAMPTZ)
//! - `updated_at`: Refreshed on every mutation (TIMESTAMPTZ)
//!
//! `updated_at >= created_at` holds for every record built through this module.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use uuid::Uuid;

/// A persisted task
///
/// The same shape is used for rows, cache snapshots (JSON) and service responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a task (without generated fields)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
}

/// Partial update applied by [`Task::apply`]
///
/// Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TaskValidationError {
    #[error("title is required")]
    EmptyTitle,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn validate(&self) -> Result<(), TaskValidationError> {
        validate_title(&self.title)
    }
}

impl TaskUpdate {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.completed.is_none()
    }
}

impl Task {
    /// Build a fresh task with a new identity. Not yet persisted.
    pub fn new(new_task: NewTask) -> Result<Self, TaskValidationError> {
        new_task.validate()?;

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            title: new_task.title,
            description: new_task.description,
            completed: false,
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply a partial update and refresh `updated_at`
    ///
    /// The task is left unchanged when validation fails.
    pub fn apply(&mut self, update: TaskUpdate) -> Result<(), TaskValidationError> {
        if let Some(title) = &update.title {
            validate_title(title)?;
        }

        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(description) = update.description {
            self.description = Some(description);
        }
        if let Some(completed) = update.completed {
            self.completed = completed;
        }
        self.touch();
        Ok(())
    }

    /// Refresh `updated_at`, never moving it backwards
    pub fn touch(&mut self) {
        self.updated_at = Utc::now().max(self.updated_at).max(self.created_at);
    }
}

fn validate_title(title: &str) -> Result<(), TaskValidationError> {
    if title.trim().is_empty() {
        return Err(TaskValidationError::EmptyTitle);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_task_defaults() {
        let task = Task::new(NewTask::new("Buy milk")).unwrap();
        assert_eq!(task.title, "Buy milk");
        assert!(!task.completed);
        assert!(task.description.is_none());
        assert_eq!(task.created_at, task.updated_at);
        assert!(!task.id.is_nil());
    }

    #[test]
    fn test_new_task_rejects_blank_title() {
        assert_eq!(
            Task::new(NewTask::new("   ")),
            Err(TaskValidationError::EmptyTitle)
        );
        assert_eq!(Task::new(NewTask::new("")), Err(TaskValidationError::EmptyTitle));
    }

    #[test]
    fn test_identities_are_unique() {
        let a = Task::new(NewTask::new("a")).unwrap();
        let b = Task::new(NewTask::new("a")).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_apply_partial_update() {
        let mut task = Task::new(NewTask::new("Buy milk").with_description("2 liters")).unwrap();
        let id = task.id;
        let created_at = task.created_at;

        task.apply(TaskUpdate::default().completed(true)).unwrap();

        assert_eq!(task.id, id);
        assert_eq!(task.title, "Buy milk");
        assert_eq!(task.description.as_deref(), Some("2 liters"));
        assert!(task.completed);
        assert_eq!(task.created_at, created_at);
        assert!(task.updated_at >= task.created_at);
    }

    #[test]
    fn test_apply_rejects_empty_title_without_mutating() {
        let mut task = Task::new(NewTask::new("Buy milk")).unwrap();
        let before = task.clone();

        let result = task.apply(TaskUpdate::default().title("").completed(true));

        assert_eq!(result, Err(TaskValidationError::EmptyTitle));
        assert_eq!(task, before);
    }

    #[test]
    fn test_touch_never_moves_backwards() {
        let mut task = Task::new(NewTask::new("clock skew")).unwrap();
        task.updated_at = task.created_at + chrono::Duration::hours(1);
        let future = task.updated_at;

        task.touch();

        assert_eq!(task.updated_at, future);
    }

    #[test]
    fn test_task_update_is_empty() {
        assert!(TaskUpdate::default().is_empty());
        assert!(!TaskUpdate::default().completed(false).is_empty());
    }
}
