//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check store invariants over arbitrary operation sequences.

use proptest::prelude::*;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use crate::backend::KeyTtl;
use crate::cache::{CacheStore, EvictionPolicy};
use crate::clock::ManualClock;

// == Test Configuration ==
const TEST_MAX_ENTRIES: usize = 100;

fn new_store(max_entries: usize, policy: EvictionPolicy) -> (CacheStore, ManualClock) {
    let clock = ManualClock::new(1_000_000);
    let store = CacheStore::new(max_entries, None, policy, Arc::new(clock.clone()));
    (store, clock)
}

// == Strategies ==
/// Generates valid cache keys (non-empty, within length limit)
fn valid_key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_:]{1,64}"
}

/// Generates cache values of arbitrary bytes
fn valid_value_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..256)
}

fn policy_strategy() -> impl Strategy<Value = EvictionPolicy> {
    prop_oneof![
        Just(EvictionPolicy::Lru),
        Just(EvictionPolicy::Lfu),
        Just(EvictionPolicy::None),
    ]
}

/// Generates a sequence of store operations for testing
#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: Vec<u8> },
    Replace { key: String, value: Vec<u8> },
    Get { key: String },
    Take { key: String },
    Delete { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    // Small key space so operations collide
    let key = "[a-e]";
    prop_oneof![
        (key, valid_value_strategy()).prop_map(|(key, value)| CacheOp::Set { key, value }),
        (key, valid_value_strategy()).prop_map(|(key, value)| CacheOp::Replace { key, value }),
        key.prop_map(|key| CacheOp::Get { key }),
        key.prop_map(|key| CacheOp::Take { key }),
        key.prop_map(|key| CacheOp::Delete { key }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Without capacity pressure or expiry the store behaves like a map.
    #[test]
    fn prop_store_matches_model(ops in prop::collection::vec(cache_op_strategy(), 1..60)) {
        let (mut store, _) = new_store(TEST_MAX_ENTRIES, EvictionPolicy::Lru);
        let mut model: HashMap<String, Vec<u8>> = HashMap::new();

        for op in ops {
            match op {
                CacheOp::Set { key, value } => {
                    store.set(key.clone(), value.clone(), None).unwrap();
                    model.insert(key, value);
                }
                CacheOp::Replace { key, value } => {
                    let previous = store.replace(key.clone(), value.clone()).unwrap();
                    prop_assert_eq!(previous, model.insert(key, value));
                }
                CacheOp::Get { key } => {
                    prop_assert_eq!(store.get(&key), model.get(&key).cloned());
                }
                CacheOp::Take { key } => {
                    prop_assert_eq!(store.take(&key), model.remove(&key));
                }
                CacheOp::Delete { key } => {
                    prop_assert_eq!(store.delete(&key), model.remove(&key).is_some());
                }
            }
        }

        prop_assert_eq!(store.len(), model.len());
    }

    // Hits and misses count exactly the reads that found or missed a value.
    #[test]
    fn prop_statistics_accuracy(ops in prop::collection::vec(cache_op_strategy(), 1..50)) {
        let (mut store, _) = new_store(TEST_MAX_ENTRIES, EvictionPolicy::Lru);
        let mut expected_hits: u64 = 0;
        let mut expected_misses: u64 = 0;

        for op in ops {
            match op {
                CacheOp::Set { key, value } => {
                    let _ = store.set(key, value, None);
                }
                CacheOp::Replace { key, value } => {
                    let _ = store.replace(key, value);
                }
                CacheOp::Get { key } => match store.get(&key) {
                    Some(_) => expected_hits += 1,
                    None => expected_misses += 1,
                },
                CacheOp::Take { key } => match store.take(&key) {
                    Some(_) => expected_hits += 1,
                    None => expected_misses += 1,
                },
                CacheOp::Delete { key } => {
                    store.delete(&key);
                }
            }
        }

        let stats = store.stats();
        prop_assert_eq!(stats.hits, expected_hits, "Hits mismatch");
        prop_assert_eq!(stats.misses, expected_misses, "Misses mismatch");
        prop_assert_eq!(stats.total_entries, store.len(), "Total entries mismatch");
    }

    // The store never holds more than its capacity, whatever the policy.
    #[test]
    fn prop_capacity_enforcement(
        entries in prop::collection::vec((valid_key_strategy(), valid_value_strategy()), 1..200),
        policy in policy_strategy(),
    ) {
        let max_entries = 50;
        let (mut store, _) = new_store(max_entries, policy);

        for (key, value) in entries {
            let _ = store.set(key, value, None);
            prop_assert!(
                store.len() <= max_entries,
                "Cache size {} exceeds max {}",
                store.len(),
                max_entries
            );
        }
    }

    // Once a TTL elapses on the store clock the entry reads as absent.
    #[test]
    fn prop_ttl_expiration_behavior(
        key in valid_key_strategy(),
        value in valid_value_strategy(),
        ttl_secs in 1u64..3600,
    ) {
        let (mut store, clock) = new_store(TEST_MAX_ENTRIES, EvictionPolicy::Lru);
        let ttl = Duration::from_secs(ttl_secs);

        store.set(key.clone(), value.clone(), Some(ttl)).unwrap();
        prop_assert_eq!(store.get(&key), Some(value));

        clock.advance(ttl - Duration::from_millis(1));
        prop_assert!(store.get(&key).is_some(), "Entry should exist before TTL elapses");

        clock.advance(Duration::from_millis(1));
        prop_assert_eq!(store.get(&key), None);
        prop_assert_eq!(store.ttl(&key), KeyTtl::Missing);
    }

    // Filling to capacity then inserting evicts the first key written.
    #[test]
    fn prop_lru_eviction_order(
        initial_keys in prop::collection::hash_set(valid_key_strategy(), 2..10),
        new_key in valid_key_strategy(),
        new_value in valid_value_strategy(),
    ) {
        prop_assume!(!initial_keys.contains(&new_key));
        let keys: Vec<String> = initial_keys.into_iter().collect();

        let capacity = keys.len();
        let (mut store, _) = new_store(capacity, EvictionPolicy::Lru);

        for key in &keys {
            store.set(key.clone(), key.as_bytes().to_vec(), None).unwrap();
        }
        store.set(new_key.clone(), new_value, None).unwrap();

        prop_assert_eq!(store.len(), capacity);
        prop_assert_eq!(store.get(&keys[0]), None, "Oldest key should have been evicted");
        prop_assert!(store.get(&new_key).is_some());
        for key in keys.iter().skip(1) {
            prop_assert!(store.get(key).is_some(), "Key '{}' should still exist", key);
        }
    }

    // Under LFU the evicted key is one of those read least often.
    #[test]
    fn prop_lfu_evicts_least_frequent(
        reads in prop::collection::vec(0usize..4, 0..40),
    ) {
        let keys = ["k0", "k1", "k2", "k3"];
        let (mut store, _) = new_store(keys.len(), EvictionPolicy::Lfu);
        let mut counts = [1u64; 4];

        for key in keys {
            store.set(key.to_string(), Vec::new(), None).unwrap();
        }
        for index in reads {
            store.get(keys[index]);
            counts[index] += 1;
        }

        store.set("fresh".to_string(), Vec::new(), None).unwrap();

        let lowest = counts.iter().copied().min().unwrap_or(0);
        let survivors: HashSet<&str> = keys
            .iter()
            .copied()
            .filter(|key| store.ttl(key) != KeyTtl::Missing)
            .collect();
        prop_assert_eq!(survivors.len(), keys.len() - 1);

        let evicted = keys.iter().position(|key| !survivors.contains(key)).unwrap();
        prop_assert_eq!(counts[evicted], lowest);
    }
}
