//! Deterministic key-to-shard routing
//!
//! CRC-32 (IEEE) of the key modulo the shard count. The mapping depends only on
//! the key and the number of shards, so changing the shard list reshuffles keys
//! and requires a full cache flush. There is no rebalancing.

/// Routes keys to shard indexes for a fixed shard count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShardRouter {
    shard_count: usize,
}

impl ShardRouter {
    pub fn new(shard_count: usize) -> Self {
        Self { shard_count }
    }

    pub fn shard_count(&self) -> usize {
        self.shard_count
    }

    /// Index in `0..shard_count` for `key`
    ///
    /// Always 0 when there is at most one shard.
    pub fn shard_index(&self, key: &str) -> usize {
        shard_for_key(key, self.shard_count)
    }
}

/// Shard index for `key` among `shard_count` shards
pub fn shard_for_key(key: &str, shard_count: usize) -> usize {
    if shard_count <= 1 {
        return 0;
    }
    crc32fast::hash(key.as_bytes()) as usize % shard_count
}
