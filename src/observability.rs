//! # Operation Observability
//!
//! Every store, cache and service operation produces an [`OperationEvent`]
//! carrying the operation name, entity identity, duration and outcome. Components
//! receive an [`OperationObserver`] at construction and hand it these facts; they
//! never format or ship logs themselves.
//!
//! [`TracingObserver`] is the production observer and turns events into
//! structured `tracing` events.

use crate::error::RepositoryErrorKind;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};
use uuid::Uuid;

/// Default threshold above which an operation is reported as slow
pub const DEFAULT_SLOW_THRESHOLD: Duration = Duration::from_millis(500);

/// Which layer produced an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Component {
    Store,
    Cache,
    Repository,
    Service,
}

impl Component {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Store => "store",
            Self::Cache => "cache",
            Self::Repository => "repository",
            Self::Service => "service",
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of an observed operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationOutcome {
    Success,
    CacheHit,
    CacheMiss,
    /// Expected negative result (e.g. unknown identity)
    NotFound,
    /// Failure returned to the caller
    Failed {
        kind: Option<RepositoryErrorKind>,
        error: String,
    },
    /// Failure recovered locally; the caller never sees it
    Swallowed { error: String },
}

impl OperationOutcome {
    pub fn failed(kind: Option<RepositoryErrorKind>, error: impl Into<String>) -> Self {
        Self::Failed {
            kind,
            error: error.into(),
        }
    }

    pub fn swallowed(error: impl Into<String>) -> Self {
        Self::Swallowed {
            error: error.into(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::CacheHit => "hit",
            Self::CacheMiss => "miss",
            Self::NotFound => "not_found",
            Self::Failed { .. } => "failed",
            Self::Swallowed { .. } => "swallowed",
        }
    }
}

/// One observed operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationEvent {
    pub component: Component,
    pub operation: &'static str,
    pub entity_id: Option<Uuid>,
    pub shard: Option<usize>,
    pub duration: Duration,
    pub slow: bool,
    pub outcome: OperationOutcome,
}

impl OperationEvent {
    pub fn new(
        component: Component,
        operation: &'static str,
        duration: Duration,
        outcome: OperationOutcome,
    ) -> Self {
        Self {
            component,
            operation,
            entity_id: None,
            shard: None,
            duration,
            slow: false,
            outcome,
        }
    }

    pub fn with_entity(mut self, entity_id: Option<Uuid>) -> Self {
        self.entity_id = entity_id;
        self
    }

    pub fn with_shard(mut self, shard: usize) -> Self {
        self.shard = Some(shard);
        self
    }

    /// Flag the event as slow when `duration` exceeds `threshold`
    pub fn with_slow_threshold(mut self, threshold: Duration) -> Self {
        self.slow = self.duration > threshold;
        self
    }
}

/// Receives operation facts from the store, cache and service layers
pub trait OperationObserver: Send + Sync + fmt::Debug {
    fn record(&self, event: &OperationEvent);
}

pub type SharedObserver = Arc<dyn OperationObserver>;

/// Observer that emits structured `tracing` events
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl TracingObserver {
    pub fn shared() -> SharedObserver {
        Arc::new(Self)
    }
}

impl OperationObserver for TracingObserver {
    fn record(&self, event: &OperationEvent) {
        let entity_id = event.entity_id.map(|id| id.to_string());
        let duration_ms = event.duration.as_millis() as u64;

        match &event.outcome {
            OperationOutcome::Failed { kind, error } => error!(
                component = %event.component,
                operation = event.operation,
                entity_id = entity_id.as_deref(),
                shard = event.shard,
                duration_ms = duration_ms,
                kind = kind.map(|k| k.as_str()),
                error = %error,
                "Operation failed"
            ),
            OperationOutcome::Swallowed { error } => warn!(
                component = %event.component,
                operation = event.operation,
                entity_id = entity_id.as_deref(),
                shard = event.shard,
                duration_ms = duration_ms,
                error = %error,
                "Best-effort operation failed, continuing"
            ),
            outcome if event.slow => warn!(
                component = %event.component,
                operation = event.operation,
                entity_id = entity_id.as_deref(),
                shard = event.shard,
                duration_ms = duration_ms,
                outcome = outcome.as_str(),
                "Slow operation detected"
            ),
            outcome => debug!(
                component = %event.component,
                operation = event.operation,
                entity_id = entity_id.as_deref(),
                shard = event.shard,
                duration_ms = duration_ms,
                outcome = outcome.as_str(),
                "Operation completed"
            ),
        }
    }
}

/// Observer that drops every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl NullObserver {
    pub fn shared() -> SharedObserver {
        Arc::new(Self)
    }
}

impl OperationObserver for NullObserver {
    fn record(&self, _event: &OperationEvent) {}
}
