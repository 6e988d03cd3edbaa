//! Cache shard backends

pub mod memory;
pub mod redis;

pub use self::memory::MemoryCacheService;
pub use self::redis::RedisCacheService;

use super::errors::CacheResult;
use super::traits::CacheService;
use std::time::Duration;

/// Scheme selecting an in-process shard instead of Redis
pub const MEMORY_ENDPOINT_SCHEME: &str = "memory://";

/// Shard backend enum for zero-cost dispatch
#[derive(Debug, Clone)]
pub enum CacheBackend {
    /// Redis shard (boxed to reduce enum size)
    Redis(Box<RedisCacheService>),

    /// In-process shard
    Memory(MemoryCacheService),
}

impl CacheBackend {
    /// Connect a shard for one configured endpoint
    pub async fn connect(
        endpoint: &str,
        password: Option<&str>,
        database: i64,
        connect_timeout: Duration,
    ) -> CacheResult<Self> {
        if endpoint.starts_with(MEMORY_ENDPOINT_SCHEME) {
            return Ok(Self::Memory(MemoryCacheService::new()));
        }

        RedisCacheService::connect(endpoint, password, database, connect_timeout)
            .await
            .map(|svc| Self::Redis(Box::new(svc)))
    }
}

impl CacheService for CacheBackend {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        match self {
            Self::Redis(s) => s.get(key).await,
            Self::Memory(s) => s.get(key).await,
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        match self {
            Self::Redis(s) => s.set(key, value, ttl).await,
            Self::Memory(s) => s.set(key, value, ttl).await,
        }
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        match self {
            Self::Redis(s) => s.delete(key).await,
            Self::Memory(s) => s.delete(key).await,
        }
    }

    async fn health_check(&self) -> CacheResult<bool> {
        match self {
            Self::Redis(s) => s.health_check().await,
            Self::Memory(s) => s.health_check().await,
        }
    }

    fn provider_name(&self) -> &'static str {
        match self {
            Self::Redis(s) => s.provider_name(),
            Self::Memory(s) => s.provider_name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_endpoint_connects_without_network() {
        let backend = CacheBackend::connect("memory://shard-0", None, 0, Duration::from_millis(10))
            .await
            .unwrap();
        assert_eq!(backend.provider_name(), "memory");
        assert!(backend.health_check().await.unwrap());
    }
}
