//! Explicitly swallowed cache results

use super::errors::CacheResult;
use crate::observability::{Component, OperationEvent, OperationObserver, OperationOutcome};
use std::time::Duration;
use uuid::Uuid;

/// A cache result whose failure must not reach the caller
///
/// The only way to consume it is [`BestEffort::swallow`], which reports a failure
/// to the observer before discarding it.
#[must_use = "best-effort cache results must be swallowed explicitly"]
#[derive(Debug)]
pub struct BestEffort<T>(CacheResult<T>);

impl<T> BestEffort<T> {
    pub fn new(result: CacheResult<T>) -> Self {
        Self(result)
    }

    /// Value on success; on failure record a `Swallowed` event and return `None`
    pub fn swallow(
        self,
        observer: &dyn OperationObserver,
        operation: &'static str,
        entity_id: Option<Uuid>,
    ) -> Option<T> {
        match self.0 {
            Ok(value) => Some(value),
            Err(error) => {
                let event = OperationEvent::new(
                    Component::Repository,
                    operation,
                    Duration::ZERO,
                    OperationOutcome::swallowed(error.to_string()),
                )
                .with_entity(entity_id);
                observer.record(&event);
                None
            }
        }
    }
}

impl<T> From<CacheResult<T>> for BestEffort<T> {
    fn from(result: CacheResult<T>) -> Self {
        Self::new(result)
    }
}
