//! Use-case layer called by transport adapters
//!
//! Services accept raw request values, validate them, call the repository and
//! translate failures into [`ServiceError`](crate::error::ServiceError).

pub mod health_service;
pub mod task_service;

pub use health_service::{ComponentHealth, HealthService, HealthState, HealthStatus};
pub use task_service::TaskService;
