//! Cache Facade
//!
//! Typed key/value operations over an injected [`CacheBackend`] and namespace
//! management over an injected [`NamedCacheRegistry`].
//!
//! # Policies
//! - `update` on a missing key creates it with no expiry
//! - `set_expire` on a missing key fails with [`CacheError::KeyNotFound`]
//! - `delete` of a missing key succeeds
//! - `create_cache` on an existing name clears it and keeps its config
//! - `clear_all_cache` stops at the first namespace that fails to clear

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::backend::{with_deadline, CacheBackend, KeyTtl};
use crate::codec::{Codec, JsonCodec};
use crate::config::{FacadeConfig, NamedCacheConfig};
use crate::error::{BackendError, CacheError, Result};
use crate::registry::{CacheHandle, NamedCache, NamedCacheRegistry};

// == Create Outcome ==
/// What `create_cache` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    /// A new cache was registered with the given config
    Created,
    /// The cache already existed and was emptied; its config is unchanged
    Cleared,
}

// == Cache Facade ==
/// Entry point for application code.
///
/// Holds no mutable state of its own; clones share the same collaborators.
#[derive(Clone)]
pub struct CacheFacade<C: Codec = JsonCodec> {
    backend: Arc<dyn CacheBackend>,
    registry: Arc<dyn NamedCacheRegistry>,
    codec: C,
    /// Deadline for each operation, None = wait as long as the backend does
    timeout: Option<Duration>,
}

impl CacheFacade<JsonCodec> {
    /// Creates a facade with compact JSON encoding and no operation timeout.
    pub fn new(backend: Arc<dyn CacheBackend>, registry: Arc<dyn NamedCacheRegistry>) -> Self {
        Self::with_codec(backend, registry, JsonCodec::new())
    }

    /// Creates a facade using the codec style and timeout from `config`.
    pub fn from_config(
        config: &FacadeConfig,
        backend: Arc<dyn CacheBackend>,
        registry: Arc<dyn NamedCacheRegistry>,
    ) -> Self {
        let codec = if config.pretty_json {
            JsonCodec::pretty()
        } else {
            JsonCodec::new()
        };
        Self::with_codec(backend, registry, codec).with_timeout(config.operation_timeout)
    }
}

impl<C: Codec> CacheFacade<C> {
    pub fn with_codec(
        backend: Arc<dyn CacheBackend>,
        registry: Arc<dyn NamedCacheRegistry>,
        codec: C,
    ) -> Self {
        Self {
            backend,
            registry,
            codec,
            timeout: None,
        }
    }

    /// Returns a facade sharing the same collaborators with a different deadline.
    pub fn with_timeout(&self, timeout: Option<Duration>) -> Self {
        Self {
            timeout,
            ..self.clone()
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    // == Save ==
    /// Stores a value with no expiry, replacing any previous value and expiry.
    pub async fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        check_key(key)?;
        let bytes = self.encode(key, value)?;

        self.run(key, self.backend.set_raw(key, bytes, None)).await?;
        debug!("Saved key '{}'", key);
        Ok(())
    }

    // == Save With Expire ==
    /// Stores a value that expires `ttl_seconds` from now.
    ///
    /// Value and expiry are written in one backend call, so either both land
    /// or the call fails.
    pub async fn save_with_expire<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl_seconds: u64,
    ) -> Result<()> {
        check_key(key)?;
        let ttl = check_ttl(key, ttl_seconds)?;
        let bytes = self.encode(key, value)?;

        self.run(key, self.backend.set_raw(key, bytes, Some(ttl)))
            .await?;
        debug!("Saved key '{}' with TTL {}s", key, ttl_seconds);
        Ok(())
    }

    // == Get ==
    /// Reads and decodes a value. None if it was never set, was deleted or expired.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        check_key(key)?;

        let bytes = self.run(key, self.backend.get_raw(key)).await?;
        match bytes {
            Some(bytes) => {
                let value = self
                    .codec
                    .decode(&bytes)
                    .map_err(|e| CacheError::encoding(key, e))?;
                Ok(Some(value))
            }
            None => {
                debug!("Cache miss for key '{}'", key);
                Ok(None)
            }
        }
    }

    // == Update ==
    /// Replaces a value atomically, keeping any expiry already set.
    ///
    /// A missing key is created with no expiry. Returns whether a previous
    /// value was replaced.
    pub async fn update<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<bool> {
        check_key(key)?;
        let bytes = self.encode(key, value)?;

        let previous = self
            .run(key, self.backend.get_and_set_raw(key, bytes))
            .await?;
        let replaced = previous.is_some();
        debug!("Updated key '{}' (existed: {})", key, replaced);
        Ok(replaced)
    }

    // == Set Expire ==
    /// Makes an existing key expire `ttl_seconds` from now, overwriting any
    /// previous expiry.
    pub async fn set_expire(&self, key: &str, ttl_seconds: u64) -> Result<()> {
        check_key(key)?;
        let ttl = check_ttl(key, ttl_seconds)?;

        let existed = self.run(key, self.backend.expire(key, ttl)).await?;
        if !existed {
            return Err(CacheError::KeyNotFound(key.to_string()));
        }
        debug!("Set TTL {}s on key '{}'", ttl_seconds, key);
        Ok(())
    }

    // == Delete ==
    /// Removes a key. Succeeds whether or not it existed; returns whether it did.
    pub async fn delete(&self, key: &str) -> Result<bool> {
        check_key(key)?;

        let previous = self.run(key, self.backend.get_and_delete_raw(key)).await?;
        let removed = previous.is_some();
        debug!("Deleted key '{}' (existed: {})", key, removed);
        Ok(removed)
    }

    // == TTL ==
    /// Remaining lifetime of a key.
    pub async fn ttl(&self, key: &str) -> Result<KeyTtl> {
        check_key(key)?;
        self.run(key, self.backend.ttl(key)).await
    }

    pub async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.ttl(key).await? != KeyTtl::Missing)
    }

    // == Create Cache ==
    /// Creates a named cache, or clears it if the name is already taken.
    ///
    /// An existing cache keeps its original config; `config` only applies to
    /// a cache created by this call.
    pub async fn create_cache(&self, name: &str, config: NamedCacheConfig) -> Result<CreateOutcome> {
        check_cache_name(name)?;

        if let Some(existing) = self.lookup(name).await? {
            self.clear_named(name, existing.as_ref()).await?;
            info!("Cache '{}' already existed and was cleared", name);
            return Ok(CreateOutcome::Cleared);
        }

        // Only a cache created here takes `config`
        if let Some(reason) = config.validate() {
            return Err(CacheError::InvalidArgument(format!(
                "Config for cache '{}': {}",
                name, reason
            )));
        }

        let created = self
            .run(name, self.registry.create_cache(name, config))
            .await;
        match created {
            Ok(_) => {
                info!("Created cache '{}'", name);
                Ok(CreateOutcome::Created)
            }
            // Another caller created it between our lookup and create
            Err(CacheError::BackendUnavailable {
                source: BackendError::AlreadyExists(_),
                ..
            }) => {
                let existing = self
                    .lookup(name)
                    .await?
                    .ok_or_else(|| CacheError::CacheNotFound(name.to_string()))?;
                self.clear_named(name, existing.as_ref()).await?;
                info!("Cache '{}' was created concurrently and was cleared", name);
                Ok(CreateOutcome::Cleared)
            }
            Err(e) => Err(e),
        }
    }

    // == Get Cache ==
    /// A typed handle on a named cache, or None if it was never created.
    pub async fn get_cache(&self, name: &str) -> Result<Option<CacheHandle<C>>> {
        check_cache_name(name)?;
        let cache = self.lookup(name).await?;
        Ok(cache.map(|cache| CacheHandle::new(cache, self.codec.clone(), self.timeout)))
    }

    // == Clear Cache ==
    /// Empties one named cache.
    pub async fn clear_cache(&self, name: &str) -> Result<()> {
        check_cache_name(name)?;
        let cache = self
            .lookup(name)
            .await?
            .ok_or_else(|| CacheError::CacheNotFound(name.to_string()))?;

        self.clear_named(name, cache.as_ref()).await?;
        info!("Cleared cache '{}'", name);
        Ok(())
    }

    // == Clear All Caches ==
    /// Empties every named cache, in name order.
    ///
    /// Stops at the first cache that fails to clear; caches before it stay
    /// cleared. Returns how many caches were cleared.
    pub async fn clear_all_cache(&self) -> Result<usize> {
        let names = self.cache_names().await?;

        let mut cleared = 0;
        for name in &names {
            // A cache that vanished since listing has nothing left to clear
            if let Some(cache) = self.lookup(name).await? {
                self.clear_named(name, cache.as_ref()).await?;
                cleared += 1;
            }
        }

        info!("Cleared {} of {} caches", cleared, names.len());
        Ok(cleared)
    }

    /// Names of every named cache, sorted.
    pub async fn cache_names(&self) -> Result<Vec<String>> {
        self.run("*", self.registry.cache_names()).await
    }

    // == Internals ==
    fn encode<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<Vec<u8>> {
        self.codec
            .encode(value)
            .map_err(|e| CacheError::encoding(key, e))
    }

    async fn lookup(&self, name: &str) -> Result<Option<Arc<dyn NamedCache>>> {
        self.run(name, self.registry.get_cache(name)).await
    }

    async fn clear_named(&self, name: &str, cache: &dyn NamedCache) -> Result<()> {
        self.run(name, cache.clear()).await
    }

    /// Awaits a collaborator call under the configured deadline and tags any
    /// failure with `target`.
    async fn run<T, F>(&self, target: &str, call: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, BackendError>>,
    {
        with_deadline(self.timeout, call).await.map_err(|e| {
            warn!("Cache operation on '{}' failed: {}", target, e);
            CacheError::backend(target, e)
        })
    }
}

fn check_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(CacheError::InvalidArgument("Key cannot be empty".to_string()));
    }
    Ok(())
}

fn check_cache_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(CacheError::InvalidArgument(
            "Cache name cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn check_ttl(key: &str, ttl_seconds: u64) -> Result<Duration> {
    if ttl_seconds == 0 {
        return Err(CacheError::InvalidArgument(format!(
            "TTL for '{}' must be greater than zero",
            key
        )));
    }
    Ok(Duration::from_secs(ttl_seconds))
}
