//! # Error Taxonomy
//!
//! Canonical error kinds shared by the storage and cache layers, plus the
//! outward translation used by transport adapters.
//!
//! ## Layers
//!
//! - [`RepositoryError`] - what a [`TaskRepository`](crate::repository::TaskRepository)
//!   returns. Classified from driver errors at the store adapter boundary only.
//! - [`StatusCategory`] - transport-agnostic outcome category. Total mapping from
//!   [`RepositoryErrorKind`].
//! - [`ServiceError`] - category plus a human-readable message safe to show callers.
//! - [`StoreError`] - startup and shutdown failures of the whole store.

use crate::cache::CacheError;
use crate::config::ConfigurationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Closed set of repository failure kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepositoryErrorKind {
    /// The identity does not exist
    NotFound,
    /// Uniqueness violation (duplicate identity)
    AlreadyExists,
    /// Any other integrity constraint violation
    ConstraintViolation,
    /// Backing store unreachable, or the call exceeded its deadline
    ConnectionError,
    /// Malformed input rejected by the store
    InvalidData,
    /// Uncategorized
    Internal,
}

impl RepositoryErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::AlreadyExists => "already_exists",
            Self::ConstraintViolation => "constraint_violation",
            Self::ConnectionError => "connection_error",
            Self::InvalidData => "invalid_data",
            Self::Internal => "internal",
        }
    }

    /// Short description used in `Display` output
    pub fn description(&self) -> &'static str {
        match self {
            Self::NotFound => "task not found",
            Self::AlreadyExists => "task already exists",
            Self::ConstraintViolation => "database constraint violation",
            Self::ConnectionError => "database connection error",
            Self::InvalidData => "invalid data provided",
            Self::Internal => "internal database error",
        }
    }
}

impl fmt::Display for RepositoryErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned by every repository operation
///
/// `Display` shows only the operation and the kind. Driver detail (SQLSTATE,
/// driver messages) is kept in [`RepositoryError::detail`] for internal logging.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{operation}: {}", .kind.description())]
pub struct RepositoryError {
    kind: RepositoryErrorKind,
    operation: &'static str,
    detail: Option<String>,
}

impl RepositoryError {
    pub fn new(kind: RepositoryErrorKind, operation: &'static str) -> Self {
        Self {
            kind,
            operation,
            detail: None,
        }
    }

    pub fn not_found(operation: &'static str) -> Self {
        Self::new(RepositoryErrorKind::NotFound, operation)
    }

    pub fn connection(operation: &'static str, detail: impl Into<String>) -> Self {
        Self::new(RepositoryErrorKind::ConnectionError, operation).with_detail(detail)
    }

    pub fn invalid_data(operation: &'static str, detail: impl Into<String>) -> Self {
        Self::new(RepositoryErrorKind::InvalidData, operation).with_detail(detail)
    }

    pub fn internal(operation: &'static str, detail: impl Into<String>) -> Self {
        Self::new(RepositoryErrorKind::Internal, operation).with_detail(detail)
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn kind(&self) -> RepositoryErrorKind {
        self.kind
    }

    pub fn operation(&self) -> &'static str {
        self.operation
    }

    /// Internal detail for logs. Never part of an outward message.
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == RepositoryErrorKind::NotFound
    }

    pub fn is_constraint_error(&self) -> bool {
        matches!(
            self.kind,
            RepositoryErrorKind::AlreadyExists | RepositoryErrorKind::ConstraintViolation
        )
    }

    pub fn is_connection_error(&self) -> bool {
        self.kind == RepositoryErrorKind::ConnectionError
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Transport-agnostic outcome category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusCategory {
    InvalidArgument,
    NotFound,
    AlreadyExists,
    FailedPrecondition,
    Unavailable,
    Internal,
}

impl StatusCategory {
    /// gRPC status code name
    pub fn code_name(&self) -> &'static str {
        match self {
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::NotFound => "NOT_FOUND",
            Self::AlreadyExists => "ALREADY_EXISTS",
            Self::FailedPrecondition => "FAILED_PRECONDITION",
            Self::Unavailable => "UNAVAILABLE",
            Self::Internal => "INTERNAL",
        }
    }

    /// Equivalent HTTP status code
    pub fn http_status(&self) -> u16 {
        match self {
            Self::InvalidArgument => 400,
            Self::NotFound => 404,
            Self::AlreadyExists => 409,
            Self::FailedPrecondition => 422,
            Self::Unavailable => 503,
            Self::Internal => 500,
        }
    }
}

impl fmt::Display for StatusCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code_name())
    }
}

impl From<RepositoryErrorKind> for StatusCategory {
    fn from(kind: RepositoryErrorKind) -> Self {
        match kind {
            RepositoryErrorKind::NotFound => Self::NotFound,
            RepositoryErrorKind::AlreadyExists => Self::AlreadyExists,
            RepositoryErrorKind::ConstraintViolation => Self::FailedPrecondition,
            RepositoryErrorKind::ConnectionError => Self::Unavailable,
            RepositoryErrorKind::InvalidData => Self::InvalidArgument,
            RepositoryErrorKind::Internal => Self::Internal,
        }
    }
}

/// Error handed to transport layers
///
/// Carries a stable category and a message that is safe to show to callers.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("code: {category}, message: {message}, time: {}", .time.to_rfc3339())]
pub struct ServiceError {
    pub category: StatusCategory,
    pub message: String,
    pub time: DateTime<Utc>,
}

impl ServiceError {
    pub fn new(category: StatusCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            time: Utc::now(),
        }
    }

    pub fn title_required() -> Self {
        Self::new(StatusCategory::InvalidArgument, "title is required")
    }

    pub fn invalid_task_id() -> Self {
        Self::new(StatusCategory::InvalidArgument, "invalid task id")
    }

    pub fn internal() -> Self {
        Self::new(StatusCategory::Internal, "internal server error")
    }
}

impl From<&RepositoryError> for ServiceError {
    fn from(error: &RepositoryError) -> Self {
        let message = match error.kind() {
            RepositoryErrorKind::NotFound => "task not found",
            RepositoryErrorKind::AlreadyExists => "task already exists",
            RepositoryErrorKind::ConstraintViolation => "task violates a data constraint",
            RepositoryErrorKind::ConnectionError => "storage temporarily unavailable",
            RepositoryErrorKind::InvalidData => "invalid task data",
            RepositoryErrorKind::Internal => return Self::internal(),
        };
        Self::new(error.kind().into(), message)
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(error: RepositoryError) -> Self {
        Self::from(&error)
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Startup and shutdown failures of the store as a whole
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
}

pub type StoreResult<T> = Result<T, StoreError>;
