//! # Sharded Task Cache
//!
//! Cache-aside support for the task repository.
//!
//! ## Architecture
//!
//! ```text
//! CachedTaskRepository
//!         │
//!         ▼
//! TaskCache<S: CacheService>   ─ JSON snapshots, deadlines, observer events
//!         │  ShardRouter (crc32(key) % N)
//!         ▼
//! ┌───────────────┬───────────────┐
//! │ shard 0       │ shard N-1     │
//! │ CacheBackend  │ CacheBackend  │  Redis (ConnectionManager) or in-memory
//! └───────────────┴───────────────┘
//! ```
//!
//! Cache contents are never authoritative. Writers mutate the store first, then
//! overwrite or invalidate entries through [`BestEffort`], which records
//! failures instead of returning them.

pub mod best_effort;
pub mod errors;
pub mod providers;
pub mod shard;
pub mod task_cache;
pub mod traits;

pub use best_effort::BestEffort;
pub use errors::{CacheError, CacheResult};
pub use providers::{CacheBackend, MemoryCacheService, RedisCacheService};
pub use shard::{shard_for_key, ShardRouter};
pub use task_cache::{task_key, CacheLookup, TaskCache, TASK_LIST_KEY};
pub use traits::CacheService;
