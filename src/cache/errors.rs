//! Cache error types

use thiserror::Error;

/// Errors that can occur during cache operations
///
/// A cache miss is not an error; see [`CacheLookup`](super::CacheLookup).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    /// Failed to connect to a shard, or the client was closed
    #[error("Cache connection error: {0}")]
    ConnectionError(String),

    /// Failed to serialize or deserialize a cached snapshot
    #[error("Cache serialization error: {0}")]
    SerializationError(String),

    /// Cache operation exceeded its deadline
    #[error("Cache operation timed out: {0}")]
    Timeout(String),

    /// Generic backend error
    #[error("Cache backend error: {0}")]
    BackendError(String),
}

impl From<serde_json::Error> for CacheError {
    fn from(error: serde_json::Error) -> Self {
        CacheError::SerializationError(error.to_string())
    }
}

/// Result type for cache operations
pub type CacheResult<T> = Result<T, CacheError>;
