//! Cache shard service trait

use super::errors::CacheResult;
use std::time::Duration;

/// Operations a single cache shard provides
///
/// Implemented by concrete shard backends (Redis, in-memory). Values are opaque
/// strings; serialization of snapshots happens in
/// [`TaskCache`](super::TaskCache).
pub trait CacheService: Send + Sync {
    /// Get a value by key
    ///
    /// Returns `Ok(Some(value))` on hit, `Ok(None)` on miss or expiry.
    fn get(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = CacheResult<Option<String>>> + Send;

    /// Set a value with a TTL
    fn set(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> impl std::future::Future<Output = CacheResult<()>> + Send;

    /// Delete a key. Deleting an absent key succeeds.
    fn delete(&self, key: &str) -> impl std::future::Future<Output = CacheResult<()>> + Send;

    /// Check that the shard answers
    fn health_check(&self) -> impl std::future::Future<Output = CacheResult<bool>> + Send;

    /// Name of the backend, for logs
    fn provider_name(&self) -> &'static str;
}
