//! In-process backend over a shared [`CacheStore`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::backend::{CacheBackend, KeyTtl};
use crate::cache::{CacheStats, CacheStore, EvictionPolicy};
use crate::clock::{Clock, SystemClock};
use crate::config::FacadeConfig;
use crate::error::BackendError;
use crate::tasks::PurgeExpired;

/// Backend keeping entries in this process.
///
/// Cloning is cheap; clones share the same store.
#[derive(Debug, Clone)]
pub struct MemoryBackend {
    store: Arc<RwLock<CacheStore>>,
}

impl MemoryBackend {
    /// Creates a backend holding at most `max_entries`, evicting LRU-first.
    pub fn new(max_entries: usize) -> Self {
        Self::with_clock(max_entries, Arc::new(SystemClock))
    }

    /// Creates a backend whose expiry follows the given clock.
    pub fn with_clock(max_entries: usize, clock: Arc<dyn Clock>) -> Self {
        let store = CacheStore::new(max_entries, None, EvictionPolicy::Lru, clock);
        Self {
            store: Arc::new(RwLock::new(store)),
        }
    }

    pub fn from_config(config: &FacadeConfig) -> Self {
        Self::new(config.max_entries)
    }

    pub async fn stats(&self) -> CacheStats {
        self.store.read().await.stats()
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }
}

#[async_trait]
impl CacheBackend for MemoryBackend {
    async fn set_raw(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Option<Duration>,
    ) -> Result<(), BackendError> {
        self.store.write().await.set(key.to_string(), value, ttl)
    }

    async fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError> {
        // Reads update LRU order and stats, so they take the write lock
        Ok(self.store.write().await.get(key))
    }

    async fn get_and_set_raw(
        &self,
        key: &str,
        value: Vec<u8>,
    ) -> Result<Option<Vec<u8>>, BackendError> {
        self.store.write().await.replace(key.to_string(), value)
    }

    async fn get_and_delete_raw(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError> {
        Ok(self.store.write().await.take(key))
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, BackendError> {
        Ok(self.store.write().await.expire(key, ttl))
    }

    async fn ttl(&self, key: &str) -> Result<KeyTtl, BackendError> {
        Ok(self.store.write().await.ttl(key))
    }
}

#[async_trait]
impl PurgeExpired for MemoryBackend {
    async fn purge_expired(&self) -> usize {
        self.store.write().await.cleanup_expired()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn backend() -> (MemoryBackend, ManualClock) {
        let clock = ManualClock::new(0);
        (MemoryBackend::with_clock(100, Arc::new(clock.clone())), clock)
    }

    #[tokio::test]
    async fn test_set_and_get_raw() {
        let (backend, _) = backend();

        backend.set_raw("k", b"v".to_vec(), None).await.unwrap();

        assert_eq!(backend.get_raw("k").await.unwrap(), Some(b"v".to_vec()));
        assert_eq!(backend.get_raw("other").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_get_and_set_keeps_expiry() {
        let (backend, clock) = backend();

        backend
            .set_raw("k", b"old".to_vec(), Some(Duration::from_secs(10)))
            .await
            .unwrap();
        let previous = backend.get_and_set_raw("k", b"new".to_vec()).await.unwrap();

        assert_eq!(previous, Some(b"old".to_vec()));
        assert_eq!(
            backend.ttl("k").await.unwrap(),
            KeyTtl::Expires(Duration::from_secs(10))
        );

        clock.advance(Duration::from_secs(10));
        assert_eq!(backend.get_raw("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_get_and_delete_raw() {
        let (backend, _) = backend();

        backend.set_raw("k", b"v".to_vec(), None).await.unwrap();

        assert_eq!(backend.get_and_delete_raw("k").await.unwrap(), Some(b"v".to_vec()));
        assert_eq!(backend.get_and_delete_raw("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expire_reports_missing() {
        let (backend, _) = backend();
        assert!(!backend.expire("k", Duration::from_secs(1)).await.unwrap());
    }

    #[tokio::test]
    async fn test_clones_share_store() {
        let (backend, _) = backend();
        let clone = backend.clone();

        backend.set_raw("k", b"v".to_vec(), None).await.unwrap();

        assert_eq!(clone.len().await, 1);
        assert_eq!(clone.get_raw("k").await.unwrap(), Some(b"v".to_vec()));
        assert_eq!(backend.stats().await.hits, 1);
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let (backend, clock) = backend();

        backend
            .set_raw("k", b"v".to_vec(), Some(Duration::from_secs(1)))
            .await
            .unwrap();
        clock.advance(Duration::from_secs(1));

        assert_eq!(backend.purge_expired().await, 1);
        assert_eq!(backend.len().await, 0);
    }
}
