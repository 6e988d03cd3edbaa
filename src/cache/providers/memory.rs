//! In-process cache shard backed by Moka
//!
//! Bounded shard with per-entry TTL. Useful for single-instance development
//! setups (`memory://` endpoints) and for exercising the sharded client
//! without a Redis server.
//!
//! **Important**: state is local to the process. Several processes sharing a
//! database each see their own cache, so invalidations do not propagate.

use crate::cache::errors::CacheResult;
use crate::cache::traits::CacheService;
use moka::Expiry;
use std::time::{Duration, Instant};
use tracing::debug;

/// Entries kept per shard before Moka starts evicting
pub const DEFAULT_MAX_CAPACITY: u64 = 10_000;

/// Longest TTL a memory entry may carry; longer requests are clamped
pub const MAX_ENTRY_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    ttl: Duration,
}

/// Expires each entry after the TTL it was written with
struct EntryTtl;

impl Expiry<String, Entry> for EntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        entry: &Entry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }

    // An overwrite restarts the clock, as `SET ... EX` does on Redis.
    fn expire_after_update(
        &self,
        _key: &String,
        entry: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// In-memory shard with per-entry expiry
///
/// Clones share the same storage.
#[derive(Clone)]
pub struct MemoryCacheService {
    cache: moka::future::Cache<String, Entry>,
    max_capacity: u64,
}

impl std::fmt::Debug for MemoryCacheService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCacheService")
            .field("max_capacity", &self.max_capacity)
            .field("entry_count", &self.cache.entry_count())
            .finish()
    }
}

impl Default for MemoryCacheService {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MAX_CAPACITY)
    }
}

impl MemoryCacheService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(max_capacity: u64) -> Self {
        let cache = moka::future::Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(EntryTtl)
            .build();

        Self {
            cache,
            max_capacity,
        }
    }

    /// Approximate entry count; exact after [`Self::run_pending_tasks`]
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Whether a live (unexpired) entry exists for `key`
    pub fn contains_key(&self, key: &str) -> bool {
        self.cache.contains_key(key)
    }

    /// Apply pending evictions and expirations
    pub async fn run_pending_tasks(&self) {
        self.cache.run_pending_tasks().await;
    }

    /// Drop every entry
    pub fn flush(&self) {
        self.cache.invalidate_all();
    }
}

impl CacheService for MemoryCacheService {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let value = self.cache.get(key).await.map(|entry| entry.value);
        debug!(key = key, hit = value.is_some(), "Cache GET (memory)");
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        let entry = Entry {
            value: value.to_string(),
            ttl: ttl.min(MAX_ENTRY_TTL),
        };
        self.cache.insert(key.to_string(), entry).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        self.cache.invalidate(key).await;
        Ok(())
    }

    async fn health_check(&self) -> CacheResult<bool> {
        Ok(true)
    }

    fn provider_name(&self) -> &'static str {
        "memory"
    }
}
