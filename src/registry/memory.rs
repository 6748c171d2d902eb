//! In-process named cache registry.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::cache::{CacheStats, CacheStore};
use crate::clock::{Clock, SystemClock};
use crate::config::NamedCacheConfig;
use crate::error::BackendError;
use crate::registry::{NamedCache, NamedCacheRegistry};
use crate::tasks::PurgeExpired;

// == Memory Named Cache ==
/// A named cache backed by its own [`CacheStore`].
#[derive(Debug)]
pub struct MemoryNamedCache {
    name: String,
    config: NamedCacheConfig,
    store: RwLock<CacheStore>,
}

impl MemoryNamedCache {
    pub fn new(name: impl Into<String>, config: NamedCacheConfig, clock: Arc<dyn Clock>) -> Self {
        let store = CacheStore::new(
            config.capacity,
            config.default_ttl_duration(),
            config.eviction,
            clock,
        );
        Self {
            name: name.into(),
            config,
            store: RwLock::new(store),
        }
    }
}

#[async_trait]
impl NamedCache for MemoryNamedCache {
    fn name(&self) -> &str {
        &self.name
    }

    fn config(&self) -> &NamedCacheConfig {
        &self.config
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError> {
        Ok(self.store.write().await.get(key))
    }

    async fn put(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Option<Duration>,
    ) -> Result<(), BackendError> {
        self.store.write().await.set(key.to_string(), value, ttl)
    }

    async fn remove(&self, key: &str) -> Result<bool, BackendError> {
        Ok(self.store.write().await.delete(key))
    }

    async fn clear(&self) -> Result<(), BackendError> {
        self.store.write().await.clear();
        Ok(())
    }

    async fn len(&self) -> Result<usize, BackendError> {
        let mut store = self.store.write().await;
        store.cleanup_expired();
        Ok(store.len())
    }

    async fn stats(&self) -> Result<CacheStats, BackendError> {
        Ok(self.store.read().await.stats())
    }
}

// == Memory Registry ==
/// Registry keeping every named cache in this process.
///
/// Cloning is cheap; clones share the same caches.
#[derive(Debug, Clone)]
pub struct MemoryRegistry {
    caches: Arc<RwLock<BTreeMap<String, Arc<MemoryNamedCache>>>>,
    clock: Arc<dyn Clock>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates a registry whose caches expire entries by the given clock.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            caches: Arc::new(RwLock::new(BTreeMap::new())),
            clock,
        }
    }
}

impl Default for MemoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NamedCacheRegistry for MemoryRegistry {
    async fn cache_names(&self) -> Result<Vec<String>, BackendError> {
        Ok(self.caches.read().await.keys().cloned().collect())
    }

    async fn get_cache(&self, name: &str) -> Result<Option<Arc<dyn NamedCache>>, BackendError> {
        let caches = self.caches.read().await;
        Ok(caches
            .get(name)
            .map(|cache| Arc::clone(cache) as Arc<dyn NamedCache>))
    }

    async fn create_cache(
        &self,
        name: &str,
        config: NamedCacheConfig,
    ) -> Result<Arc<dyn NamedCache>, BackendError> {
        let mut caches = self.caches.write().await;
        if caches.contains_key(name) {
            return Err(BackendError::AlreadyExists(name.to_string()));
        }

        let cache = Arc::new(MemoryNamedCache::new(name, config, Arc::clone(&self.clock)));
        caches.insert(name.to_string(), Arc::clone(&cache));
        debug!("Registered named cache '{}'", name);

        Ok(cache)
    }
}

#[async_trait]
impl PurgeExpired for MemoryRegistry {
    async fn purge_expired(&self) -> usize {
        let caches: Vec<Arc<MemoryNamedCache>> =
            self.caches.read().await.values().cloned().collect();

        let mut removed = 0;
        for cache in caches {
            removed += cache.store.write().await.cleanup_expired();
        }
        removed
    }
}
