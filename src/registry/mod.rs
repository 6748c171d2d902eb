//! Registry Module
//!
//! Named caches: independently configured namespaces looked up by name.
//!
//! The facade talks to a [`NamedCacheRegistry`]; callers get typed
//! [`CacheHandle`]s scoped to one namespace.

mod handle;
mod memory;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::cache::CacheStats;
use crate::config::NamedCacheConfig;
use crate::error::BackendError;

pub use handle::CacheHandle;
pub use memory::{MemoryNamedCache, MemoryRegistry};

// == Named Cache Trait ==
/// One namespace of byte values with its own capacity, TTL and eviction.
#[async_trait]
pub trait NamedCache: Send + Sync {
    fn name(&self) -> &str;

    /// Settings the cache was created with.
    fn config(&self) -> &NamedCacheConfig;

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError>;

    /// Writes a value; `ttl` None falls back to the cache's default TTL.
    async fn put(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Option<Duration>,
    ) -> Result<(), BackendError>;

    /// Returns whether a live entry was removed.
    async fn remove(&self, key: &str) -> Result<bool, BackendError>;

    async fn clear(&self) -> Result<(), BackendError>;

    /// Number of live entries.
    async fn len(&self) -> Result<usize, BackendError>;

    async fn stats(&self) -> Result<CacheStats, BackendError>;
}

// == Named Cache Registry Trait ==
/// Manager of named caches.
#[async_trait]
pub trait NamedCacheRegistry: Send + Sync {
    /// Names of every cache, sorted.
    async fn cache_names(&self) -> Result<Vec<String>, BackendError>;

    async fn get_cache(&self, name: &str) -> Result<Option<Arc<dyn NamedCache>>, BackendError>;

    /// Creates a cache. Fails with [`BackendError::AlreadyExists`] if the name is taken.
    async fn create_cache(
        &self,
        name: &str,
        config: NamedCacheConfig,
    ) -> Result<Arc<dyn NamedCache>, BackendError>;
}
