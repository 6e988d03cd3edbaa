#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Checklist Store
//!
//! Storage-and-cache coordination layer for a task service: a PostgreSQL
//! repository, a sharded Redis cache in front of it, and one error taxonomy
//! for both.
//!
//! ## Architecture
//!
//! ```text
//! transport adapter (gRPC / HTTP, out of crate)
//!         │
//!         ▼
//! TaskService ──► dyn TaskRepository
//!                     │
//!          ┌──────────┴───────────┐
//!          ▼                      ▼
//! CachedTaskRepository ──► PgTaskRepository ──► PostgreSQL
//!          │
//!          ▼
//!      TaskCache ──► crc32(key) % N ──► Redis shard 0..N-1
//! ```
//!
//! The store is the source of truth. The cache is consulted on reads and
//! invalidated after writes; any cache failure degrades to a store read and is
//! reported through the [`observability::OperationObserver`], never returned.
//!
//! ## Module Organization
//!
//! - [`models`] - the `Task` record and its mutation rules
//! - [`repository`] - `TaskRepository`, the PostgreSQL adapter and the cache-aside decorator
//! - [`cache`] - sharded cache client and shard backends
//! - [`error`] - repository error kinds and their outward status categories
//! - [`services`] - task and health use cases for transport adapters
//! - [`config`] - typed configuration loaded from TOML and the environment
//! - [`bootstrap`] - `StoreContext`, the wired-up store
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use checklist_store::bootstrap::StoreContext;
//! use checklist_store::config::ConfigLoader;
//! use checklist_store::observability::TracingObserver;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigLoader::new().load()?;
//! let store = StoreContext::initialize(&config, TracingObserver::shared()).await?;
//!
//! let task = store.task_service().create_task("Buy milk", None).await?;
//! println!("created {}", task.id);
//!
//! store.shutdown().await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Testing
//!
//! ```bash
//! cargo test                                # unit and in-memory integration tests
//! cargo test --features test-services       # plus PostgreSQL (DATABASE_URL) and Redis (REDIS_URL)
//! ```

pub mod bootstrap;
pub mod cache;
pub mod config;
pub mod database;
pub mod error;
pub mod logging;
pub mod models;
pub mod observability;
pub mod repository;
pub mod services;

pub use bootstrap::StoreContext;
pub use cache::{CacheError, CacheLookup, TaskCache};
pub use config::{ConfigLoader, StoreConfig};
pub use error::{
    RepositoryError, RepositoryErrorKind, RepositoryResult, ServiceError, ServiceResult,
    StatusCategory, StoreError, StoreResult,
};
pub use models::{NewTask, Task, TaskUpdate};
pub use observability::{OperationEvent, OperationObserver, SharedObserver, TracingObserver};
pub use repository::{CachedTaskRepository, PgTaskRepository, TaskRepository};
pub use services::{HealthService, HealthStatus, TaskService};
