//! # Models
//!
//! Domain records persisted by the store and cached by the cache layer.

pub mod task;

pub use task::{NewTask, Task, TaskUpdate, TaskValidationError};
