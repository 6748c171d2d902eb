//! Typed access to one named cache.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::backend::with_deadline;
use crate::cache::CacheStats;
use crate::codec::Codec;
use crate::config::NamedCacheConfig;
use crate::error::{BackendError, CacheError, Result};
use crate::registry::NamedCache;

/// A named cache plus the codec used to store values in it.
///
/// Errors name the cache rather than the key. Every call is bounded by the
/// deadline of the facade that handed out the handle.
#[derive(Clone)]
pub struct CacheHandle<C: Codec> {
    cache: Arc<dyn NamedCache>,
    codec: C,
    timeout: Option<Duration>,
}

impl<C: Codec> CacheHandle<C> {
    pub(crate) fn new(cache: Arc<dyn NamedCache>, codec: C, timeout: Option<Duration>) -> Self {
        Self {
            cache,
            codec,
            timeout,
        }
    }

    pub fn name(&self) -> &str {
        self.cache.name()
    }

    pub fn config(&self) -> &NamedCacheConfig {
        self.cache.config()
    }

    /// Reads and decodes a value, None if absent or expired.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let bytes = self.run(self.cache.get(key)).await?;

        bytes
            .map(|bytes| self.codec.decode(&bytes))
            .transpose()
            .map_err(|e| CacheError::encoding(self.name(), e))
    }

    /// Encodes and stores a value under the cache's default TTL.
    pub async fn put<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        self.write(key, value, None).await
    }

    /// Encodes and stores a value that expires after `ttl_seconds`.
    pub async fn put_with_expire<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl_seconds: u64,
    ) -> Result<()> {
        if ttl_seconds == 0 {
            return Err(CacheError::InvalidArgument(format!(
                "TTL for '{}' in cache '{}' must be greater than zero",
                key,
                self.name()
            )));
        }
        self.write(key, value, Some(Duration::from_secs(ttl_seconds)))
            .await
    }

    /// Returns whether an entry was removed.
    pub async fn remove(&self, key: &str) -> Result<bool> {
        self.run(self.cache.remove(key)).await
    }

    pub async fn clear(&self) -> Result<()> {
        self.run(self.cache.clear()).await
    }

    pub async fn len(&self) -> Result<usize> {
        self.run(self.cache.len()).await
    }

    pub async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }

    pub async fn stats(&self) -> Result<CacheStats> {
        self.run(self.cache.stats()).await
    }

    async fn write<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> Result<()> {
        let bytes = self
            .codec
            .encode(value)
            .map_err(|e| CacheError::encoding(self.name(), e))?;

        self.run(self.cache.put(key, bytes, ttl)).await
    }

    async fn run<T, F>(&self, call: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, BackendError>>,
    {
        with_deadline(self.timeout, call)
            .await
            .map_err(|e| CacheError::backend(self.name(), e))
    }
}

impl<C: Codec> fmt::Debug for CacheHandle<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheHandle")
            .field("name", &self.name())
            .field("config", self.config())
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::codec::JsonCodec;
    use crate::registry::MemoryNamedCache;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Session {
        user: String,
        scopes: Vec<String>,
    }

    fn handle(config: NamedCacheConfig) -> (CacheHandle<JsonCodec>, ManualClock) {
        let clock = ManualClock::new(0);
        let cache = MemoryNamedCache::new("sessions", config, Arc::new(clock.clone()));
        (CacheHandle::new(Arc::new(cache), JsonCodec::new(), None), clock)
    }

    #[tokio::test]
    async fn test_typed_put_and_get() {
        let (handle, _) = handle(NamedCacheConfig::default());
        let session = Session {
            user: "ann".to_string(),
            scopes: vec!["read".to_string()],
        };

        handle.put("s1", &session).await.unwrap();

        let back: Option<Session> = handle.get("s1").await.unwrap();
        assert_eq!(back, Some(session));
        assert_eq!(handle.get::<Session>("s2").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_put_with_expire() {
        let (handle, clock) = handle(NamedCacheConfig::default());

        handle.put_with_expire("s1", "token", 3).await.unwrap();
        assert_eq!(handle.get::<String>("s1").await.unwrap().as_deref(), Some("token"));

        clock.advance(Duration::from_secs(3));
        assert_eq!(handle.get::<String>("s1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_put_with_zero_ttl_rejected() {
        let (handle, _) = handle(NamedCacheConfig::default());

        let result = handle.put_with_expire("s1", "token", 0).await;
        assert!(matches!(result, Err(CacheError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_decode_error_names_cache() {
        let (handle, _) = handle(NamedCacheConfig::default());

        handle.put("s1", &[1, 2, 3]).await.unwrap();
        let result = handle.get::<Session>("s1").await;

        assert!(matches!(result, Err(CacheError::Encoding { target, .. }) if target == "sessions"));
    }

    #[tokio::test]
    async fn test_capacity_error_names_cache() {
        let config = NamedCacheConfig::new(1).with_eviction(crate::cache::EvictionPolicy::None);
        let (handle, _) = handle(config);

        handle.put("a", &1).await.unwrap();
        let result = handle.put("b", &2).await;

        assert!(
            matches!(result, Err(CacheError::BackendUnavailable { target, .. }) if target == "sessions")
        );
    }

    #[tokio::test]
    async fn test_oversized_value_is_invalid_argument() {
        let (handle, _) = handle(NamedCacheConfig::default());
        let value = "v".repeat(crate::cache::MAX_VALUE_SIZE);

        let result = handle.put("big", &value).await;

        assert!(matches!(result, Err(CacheError::InvalidArgument(ref msg)) if msg.contains("sessions")));
        assert!(handle.is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn test_remove_clear_len() {
        let (handle, _) = handle(NamedCacheConfig::default());

        handle.put("a", &1).await.unwrap();
        handle.put("b", &2).await.unwrap();
        assert_eq!(handle.len().await.unwrap(), 2);

        assert!(handle.remove("a").await.unwrap());
        handle.clear().await.unwrap();
        assert!(handle.is_empty().await.unwrap());
        assert_eq!(handle.stats().await.unwrap().total_entries, 0);
    }
}
