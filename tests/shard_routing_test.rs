use checklist_store::cache::{shard_for_key, task_key, ShardRouter, TASK_LIST_KEY};
use proptest::prelude::*;
use uuid::Uuid;

proptest! {
    /// Property: the shard index is always within range
    #[test]
    fn shard_index_in_range(key in ".*", shards in 1usize..64) {
        prop_assert!(shard_for_key(&key, shards) < shards);
    }

    /// Property: routing depends only on key and shard count
    #[test]
    fn routing_is_deterministic(bytes in any::<[u8; 16]>(), shards in 1usize..32) {
        let key = task_key(Uuid::from_bytes(bytes));
        let a = ShardRouter::new(shards);
        let b = ShardRouter::new(shards);
        prop_assert_eq!(a.shard_index(&key), b.shard_index(&key));
        prop_assert_eq!(a.shard_index(&key), shard_for_key(&key, shards));
    }

    /// Property: a single shard never hashes
    #[test]
    fn single_shard_is_zero(key in ".*") {
        prop_assert_eq!(shard_for_key(&key, 1), 0);
    }
}

#[test]
fn test_changing_shard_count_moves_some_keys() {
    let keys: Vec<String> = (0..200u128)
        .map(|i| task_key(Uuid::from_u128(i)))
        .collect();

    let moved = keys
        .iter()
        .filter(|key| shard_for_key(key, 3) != shard_for_key(key, 4))
        .count();

    assert!(moved > 0);
    assert!(moved < keys.len());
}

#[test]
fn test_keys_spread_over_every_shard() {
    let router = ShardRouter::new(4);
    let mut seen = [0usize; 4];
    for i in 0..400u128 {
        seen[router.shard_index(&task_key(Uuid::from_u128(i)))] += 1;
    }
    assert!(seen.iter().all(|&count| count > 0), "distribution: {seen:?}");
}

#[test]
fn test_list_key_has_fixed_shard() {
    let expected = crc32fast::hash(TASK_LIST_KEY.as_bytes()) as usize % 5;
    assert_eq!(ShardRouter::new(5).shard_index(TASK_LIST_KEY), expected);
}
