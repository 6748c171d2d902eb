//! Eviction Tracker Module
//!
//! Tracks key usage so a full store can pick which entry to drop.

use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};

// == Eviction Policy ==
/// Strategy applied when a store is at capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvictionPolicy {
    /// Drop the least recently used key
    #[default]
    Lru,
    /// Drop the least frequently used key, oldest first on ties
    Lfu,
    /// Never drop; writes of new keys fail once full
    None,
}

// == Eviction Tracker ==
/// Tracks access order (and access counts for LFU).
///
/// Keys are stored in a VecDeque where:
/// - Front = Most recently used
/// - Back = Least recently used
#[derive(Debug, Default)]
pub struct EvictionTracker {
    policy: EvictionPolicy,
    /// Order of keys by access time
    order: VecDeque<String>,
    /// Access counts, only maintained under LFU
    frequencies: HashMap<String, u64>,
}

impl EvictionTracker {
    // == Constructor ==
    /// Creates a new empty tracker for the given policy.
    pub fn new(policy: EvictionPolicy) -> Self {
        Self {
            policy,
            order: VecDeque::new(),
            frequencies: HashMap::new(),
        }
    }

    pub fn policy(&self) -> EvictionPolicy {
        self.policy
    }

    // == Touch ==
    /// Records an access: moves the key to the front and bumps its count.
    pub fn touch(&mut self, key: &str) {
        self.order.retain(|k| k != key);
        self.order.push_front(key.to_string());

        if self.policy == EvictionPolicy::Lfu {
            *self.frequencies.entry(key.to_string()).or_insert(0) += 1;
        }
    }

    // == Remove ==
    /// Removes a key from the tracker.
    pub fn remove(&mut self, key: &str) {
        self.order.retain(|k| k != key);
        self.frequencies.remove(key);
    }

    // == Evict ==
    /// Returns and forgets the key the policy would drop next.
    ///
    /// Returns None if the tracker is empty or the policy never evicts.
    pub fn evict(&mut self) -> Option<String> {
        let victim = self.peek_victim()?.clone();
        self.remove(&victim);
        Some(victim)
    }

    /// Returns the key the policy would drop next without removing it.
    pub fn peek_victim(&self) -> Option<&String> {
        match self.policy {
            EvictionPolicy::Lru => self.order.back(),
            EvictionPolicy::Lfu => {
                // Walk oldest to newest so ties go to the least recent key
                let mut best: Option<(&String, u64)> = None;
                for key in self.order.iter().rev() {
                    let count = self.frequencies.get(key).copied().unwrap_or(0);
                    if best.map_or(true, |(_, lowest)| count < lowest) {
                        best = Some((key, count));
                    }
                }
                best.map(|(key, _)| key)
            }
            EvictionPolicy::None => None,
        }
    }

    /// Forgets every key.
    pub fn clear(&mut self) {
        self.order.clear();
        self.frequencies.clear();
    }

    // == Length ==
    /// Returns the number of tracked keys.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[cfg(test)]
    pub fn contains(&self, key: &str) -> bool {
        self.order.iter().any(|k| k == key)
    }
}
