//! Cache Store Module
//!
//! Storage engine shared by the in-process backend and named caches: a HashMap
//! of entries plus an eviction tracker and TTL expiration.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::backend::KeyTtl;
use crate::cache::{
    CacheEntry, CacheStats, EvictionPolicy, EvictionTracker, MAX_KEY_LENGTH, MAX_VALUE_SIZE,
};
use crate::clock::Clock;
use crate::error::BackendError;

// == Cache Store ==
/// Key/value storage with capacity eviction and TTL support.
///
/// Expired entries are invisible to every read and are removed lazily when
/// touched, or in bulk by [`CacheStore::cleanup_expired`].
#[derive(Debug)]
pub struct CacheStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Access tracker deciding eviction order
    tracker: EvictionTracker,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries allowed
    max_entries: usize,
    /// TTL applied to writes that do not carry one, None = never expire
    default_ttl: Option<Duration>,
    clock: Arc<dyn Clock>,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a new CacheStore.
    ///
    /// # Arguments
    /// * `max_entries` - Maximum number of entries the store can hold
    /// * `default_ttl` - TTL for writes without an explicit one
    /// * `policy` - What to drop when full
    /// * `clock` - Time source for stamping and expiring entries
    pub fn new(
        max_entries: usize,
        default_ttl: Option<Duration>,
        policy: EvictionPolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            entries: HashMap::new(),
            tracker: EvictionTracker::new(policy),
            stats: CacheStats::new(),
            max_entries,
            default_ttl,
            clock,
        }
    }

    // == Set ==
    /// Stores a key-value pair, overwriting any previous value and TTL.
    ///
    /// If the store is at capacity, expired entries are purged first and then
    /// the eviction policy picks a victim.
    ///
    /// # Arguments
    /// * `key` - The key to store
    /// * `value` - The value to store
    /// * `ttl` - Optional TTL (uses the default TTL if None)
    pub fn set(
        &mut self,
        key: String,
        value: Vec<u8>,
        ttl: Option<Duration>,
    ) -> Result<(), BackendError> {
        validate(&key, &value)?;
        self.make_room(&key)?;

        let entry = CacheEntry::new(value, ttl.or(self.default_ttl), self.clock.now_ms());
        self.entries.insert(key.clone(), entry);
        self.tracker.touch(&key);
        self.sync_len();

        Ok(())
    }

    // == Get ==
    /// Retrieves a value by key, or None if absent or expired.
    pub fn get(&mut self, key: &str) -> Option<Vec<u8>> {
        self.purge_if_expired(key);

        let value = self.entries.get(key).map(|entry| entry.value.clone());
        match value {
            Some(_) => {
                self.stats.record_hit();
                self.tracker.touch(key);
            }
            None => self.stats.record_miss(),
        }
        value
    }

    // == Replace ==
    /// Swaps in a new value while keeping the entry's expiration.
    ///
    /// A missing key is inserted as if by [`CacheStore::set`] with no TTL.
    /// Returns the previous value.
    pub fn replace(&mut self, key: String, value: Vec<u8>) -> Result<Option<Vec<u8>>, BackendError> {
        validate(&key, &value)?;
        self.purge_if_expired(&key);

        if let Some(entry) = self.entries.get_mut(&key) {
            let previous = std::mem::replace(&mut entry.value, value);
            self.tracker.touch(&key);
            return Ok(Some(previous));
        }

        self.set(key, value, None)?;
        Ok(None)
    }

    // == Take ==
    /// Removes an entry and returns its value.
    pub fn take(&mut self, key: &str) -> Option<Vec<u8>> {
        self.purge_if_expired(key);

        let entry = self.entries.remove(key);
        match entry {
            Some(entry) => {
                self.stats.record_hit();
                self.tracker.remove(key);
                self.sync_len();
                Some(entry.value)
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Delete ==
    /// Removes an entry by key. Returns whether a live entry was removed.
    pub fn delete(&mut self, key: &str) -> bool {
        self.purge_if_expired(key);

        if self.entries.remove(key).is_some() {
            self.tracker.remove(key);
            self.sync_len();
            true
        } else {
            false
        }
    }

    // == Expire ==
    /// Sets the entry to expire `ttl` from now. Returns false if the key is absent.
    pub fn expire(&mut self, key: &str, ttl: Duration) -> bool {
        self.purge_if_expired(key);

        let now = self.clock.now_ms();
        match self.entries.get_mut(key) {
            Some(entry) => {
                entry.expire_after(ttl, now);
                true
            }
            None => false,
        }
    }

    // == TTL ==
    /// Reports how long a key has left to live.
    pub fn ttl(&mut self, key: &str) -> KeyTtl {
        self.purge_if_expired(key);

        let now = self.clock.now_ms();
        match self.entries.get(key) {
            None => KeyTtl::Missing,
            Some(entry) => entry
                .ttl_remaining(now)
                .map_or(KeyTtl::Persistent, KeyTtl::Expires),
        }
    }

    // == Clear ==
    /// Drops every entry. Counters are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.tracker.clear();
        self.sync_len();
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the store.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = self.clock.now_ms();
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();

        let count = expired_keys.len();

        for key in expired_keys {
            self.entries.remove(&key);
            self.tracker.remove(&key);
        }

        self.stats.record_expirations(count);
        self.sync_len();
        count
    }

    /// Returns the number of stored entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    // == Internals ==
    fn purge_if_expired(&mut self, key: &str) {
        let now = self.clock.now_ms();
        let expired = self
            .entries
            .get(key)
            .map_or(false, |entry| entry.is_expired(now));

        if expired {
            self.entries.remove(key);
            self.tracker.remove(key);
            self.stats.record_expirations(1);
            self.sync_len();
        }
    }

    /// Frees one slot for `key` if it is new and the store is full.
    fn make_room(&mut self, key: &str) -> Result<(), BackendError> {
        if self.entries.contains_key(key) || self.entries.len() < self.max_entries {
            return Ok(());
        }

        if self.cleanup_expired() > 0 && self.entries.len() < self.max_entries {
            return Ok(());
        }

        match self.tracker.evict() {
            Some(evicted_key) => {
                self.entries.remove(&evicted_key);
                self.stats.record_eviction();
                self.sync_len();
                Ok(())
            }
            None => Err(BackendError::CapacityExceeded(format!(
                "Store is full at {} entries and policy {:?} does not evict",
                self.max_entries,
                self.tracker.policy()
            ))),
        }
    }

    fn sync_len(&mut self) {
        self.stats.set_total_entries(self.entries.len());
    }
}

fn validate(key: &str, value: &[u8]) -> Result<(), BackendError> {
    if key.len() > MAX_KEY_LENGTH {
        return Err(BackendError::Rejected(format!(
            "Key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        )));
    }

    if value.len() > MAX_VALUE_SIZE {
        return Err(BackendError::Rejected(format!(
            "Value exceeds maximum size of {} bytes",
            MAX_VALUE_SIZE
        )));
    }

    Ok(())
}
