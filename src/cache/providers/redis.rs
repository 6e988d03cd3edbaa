//! Redis cache shard
//!
//! Uses `redis::aio::ConnectionManager` for async multiplexed connections with
//! automatic reconnection. One instance per configured endpoint.

use crate::cache::errors::{CacheError, CacheResult};
use crate::cache::traits::CacheService;
use crate::config::redact_url;
use redis::IntoConnectionInfo;
use std::time::Duration;
use tracing::debug;

/// Redis-backed shard using ConnectionManager
#[derive(Clone)]
pub struct RedisCacheService {
    connection_manager: redis::aio::ConnectionManager,
    endpoint: String,
}

impl std::fmt::Debug for RedisCacheService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCacheService")
            .field("endpoint", &redact_url(&self.endpoint))
            .field("connection_manager", &"ConnectionManager")
            .finish()
    }
}

impl RedisCacheService {
    /// Connect to one shard and verify it answers `PING`
    ///
    /// `endpoint` is either `host:port` or a full `redis://` / `rediss://` URL.
    /// For `host:port`, `password` and `database` are passed as connection
    /// options, so the password needs no URL encoding.
    pub async fn connect(
        endpoint: &str,
        password: Option<&str>,
        database: i64,
        connect_timeout: Duration,
    ) -> CacheResult<Self> {
        let info = connection_info(endpoint, password, database)?;

        let client = redis::Client::open(info).map_err(|e| {
            CacheError::ConnectionError(format!("Failed to create Redis client: {}", e))
        })?;

        let connection_manager =
            tokio::time::timeout(connect_timeout, redis::aio::ConnectionManager::new(client))
                .await
                .map_err(|_| {
                    CacheError::Timeout(format!(
                        "Redis connect exceeded {}ms",
                        connect_timeout.as_millis()
                    ))
                })?
                .map_err(|e| {
                    CacheError::ConnectionError(format!("Failed to connect to Redis: {}", e))
                })?;

        let service = Self {
            connection_manager,
            endpoint: endpoint.to_string(),
        };

        let healthy = tokio::time::timeout(connect_timeout, service.health_check())
            .await
            .map_err(|_| {
                CacheError::Timeout(format!(
                    "Redis PING exceeded {}ms",
                    connect_timeout.as_millis()
                ))
            })??;
        if !healthy {
            return Err(CacheError::ConnectionError(
                "Redis PING returned an unexpected reply".to_string(),
            ));
        }

        debug!(endpoint = %redact_url(endpoint), "Redis cache shard connected");

        Ok(service)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl CacheService for RedisCacheService {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.connection_manager.clone();
        let result: Option<String> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(|e| CacheError::BackendError(format!("Redis GET failed: {}", e)))?;

        Ok(result)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        let mut conn = self.connection_manager.clone();
        let ttl_millis = (ttl.as_millis() as u64).max(1);

        redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("PX")
            .arg(ttl_millis)
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| CacheError::BackendError(format!("Redis SET failed: {}", e)))?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        let mut conn = self.connection_manager.clone();

        redis::cmd("DEL")
            .arg(key)
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| CacheError::BackendError(format!("Redis DEL failed: {}", e)))?;

        Ok(())
    }

    async fn health_check(&self) -> CacheResult<bool> {
        let mut conn = self.connection_manager.clone();
        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| CacheError::BackendError(format!("Redis PING failed: {}", e)))?;

        Ok(pong == "PONG")
    }

    fn provider_name(&self) -> &'static str {
        "redis"
    }
}

const DEFAULT_REDIS_PORT: u16 = 6379;

/// Connection settings for one shard
fn connection_info(
    endpoint: &str,
    password: Option<&str>,
    database: i64,
) -> CacheResult<redis::ConnectionInfo> {
    let invalid =
        |reason: String| CacheError::ConnectionError(format!("Invalid Redis endpoint: {reason}"));

    if endpoint.contains("://") {
        return endpoint
            .into_connection_info()
            .map_err(|e| invalid(format!("{} ({})", redact_url(endpoint), e)));
    }

    let (host, port) = match endpoint.rsplit_once(':') {
        Some((host, port)) => {
            let port = port
                .parse::<u16>()
                .map_err(|_| invalid(format!("bad port in {endpoint}")))?;
            (host, port)
        }
        None => (endpoint, DEFAULT_REDIS_PORT),
    };
    let host = host.trim_start_matches('[').trim_end_matches(']');
    if host.is_empty() {
        return Err(invalid(format!("missing host in {endpoint}")));
    }

    Ok(redis::ConnectionInfo {
        addr: redis::ConnectionAddr::Tcp(host.to_string(), port),
        redis: redis::RedisConnectionInfo {
            db: database,
            password: password.filter(|p| !p.is_empty()).map(str::to_string),
            ..Default::default()
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tcp(host: &str, port: u16) -> redis::ConnectionAddr {
        redis::ConnectionAddr::Tcp(host.to_string(), port)
    }

    #[test]
    fn test_connection_info_host_port() {
        let info = connection_info("localhost:6379", None, 0).unwrap();
        assert_eq!(info.addr, tcp("localhost", 6379));
        assert_eq!(info.redis.db, 0);
        assert_eq!(info.redis.password, None);
    }

    #[test]
    fn test_connection_info_password_with_reserved_characters() {
        let info = connection_info("cache-1:6379", Some("p@ss/w#rd"), 2).unwrap();
        assert_eq!(info.addr, tcp("cache-1", 6379));
        assert_eq!(info.redis.db, 2);
        assert_eq!(info.redis.password.as_deref(), Some("p@ss/w#rd"));

        redis::Client::open(info).unwrap();
    }

    #[test]
    fn test_connection_info_empty_password_ignored() {
        let info = connection_info("redis-2:6380", Some(""), 1).unwrap();
        assert_eq!(info.redis.password, None);
        assert_eq!(info.redis.db, 1);
    }

    #[test]
    fn test_connection_info_default_port() {
        let info = connection_info("redis-3", None, 0).unwrap();
        assert_eq!(info.addr, tcp("redis-3", DEFAULT_REDIS_PORT));
    }

    #[test]
    fn test_connection_info_bad_port_rejected() {
        assert!(matches!(
            connection_info("redis-3:notaport", None, 0),
            Err(CacheError::ConnectionError(_))
        ));
    }

    #[test]
    fn test_connection_info_url_passthrough() {
        let info =
            connection_info("redis://user:pw@cache.example.com:6380/4", Some("ignored"), 0)
                .unwrap();
        assert_eq!(info.addr, tcp("cache.example.com", 6380));
        assert_eq!(info.redis.db, 4);
        assert_eq!(info.redis.password.as_deref(), Some("pw"));
    }

    // Integration tests require a running Redis instance (behind test-services feature)
    #[cfg(feature = "test-services")]
    mod integration {
        use super::*;
        use tracing::warn;

        fn redis_endpoint() -> String {
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string())
        }

        async fn connect() -> Option<RedisCacheService> {
            match RedisCacheService::connect(&redis_endpoint(), None, 0, Duration::from_secs(5))
                .await
            {
                Ok(svc) => Some(svc),
                Err(e) => {
                    warn!("Skipping Redis test (not available): {}", e);
                    None
                }
            }
        }

        #[tokio::test]
        async fn test_redis_crud_operations() {
            let Some(svc) = connect().await else { return };

            let key = format!("test:crud:{}", uuid::Uuid::new_v4());
            let value = r#"{"title":"Buy milk"}"#;

            svc.set(&key, value, Duration::from_secs(60)).await.unwrap();
            assert_eq!(svc.get(&key).await.unwrap(), Some(value.to_string()));

            svc.delete(&key).await.unwrap();
            assert_eq!(svc.get(&key).await.unwrap(), None);

            // Deleting again is not an error
            svc.delete(&key).await.unwrap();
        }

        #[tokio::test]
        async fn test_redis_ttl_expiry() {
            let Some(svc) = connect().await else { return };

            let key = format!("test:ttl:{}", uuid::Uuid::new_v4());
            svc.set(&key, "temporary", Duration::from_millis(200))
                .await
                .unwrap();
            assert!(svc.get(&key).await.unwrap().is_some());

            tokio::time::sleep(Duration::from_millis(400)).await;
            assert!(svc.get(&key).await.unwrap().is_none());
        }

        #[tokio::test]
        async fn test_redis_health_check() {
            let Some(svc) = connect().await else { return };
            assert!(svc.health_check().await.unwrap());
        }
    }
}
