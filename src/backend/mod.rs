//! Backend Module
//!
//! The key-value store the facade writes to. The facade only sees the
//! [`CacheBackend`] trait; storage, eviction, expiry and atomicity are the
//! backend's job.

mod memory;
#[cfg(feature = "redis-backend")]
mod redis;

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::BackendError;

pub use memory::MemoryBackend;
#[cfg(feature = "redis-backend")]
pub use self::redis::RedisBackend;

// == Key TTL ==
/// Remaining lifetime of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyTtl {
    /// No live entry under this key
    Missing,
    /// Entry exists and never expires
    Persistent,
    /// Entry expires after this long
    Expires(Duration),
}

// == Cache Backend Trait ==
/// Raw byte-level operations on a key-value store.
///
/// Each method is a single atomic step on the store.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Writes a value, replacing any previous value and expiry.
    async fn set_raw(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Option<Duration>,
    ) -> Result<(), BackendError>;

    /// Reads a value, None if absent or expired.
    async fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError>;

    /// Replaces a value without touching its expiry and returns the old one.
    ///
    /// A missing key is created with no expiry.
    async fn get_and_set_raw(
        &self,
        key: &str,
        value: Vec<u8>,
    ) -> Result<Option<Vec<u8>>, BackendError>;

    /// Removes a value and returns it.
    async fn get_and_delete_raw(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError>;

    /// Sets a key to expire `ttl` from now. Returns false if the key is absent.
    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, BackendError>;

    /// Reports the remaining lifetime of a key.
    async fn ttl(&self, key: &str) -> Result<KeyTtl, BackendError>;
}

// == Deadline ==
/// Awaits a collaborator call, failing with [`BackendError::Timeout`] once
/// `limit` elapses. None waits for as long as the call takes.
pub(crate) async fn with_deadline<T, F>(limit: Option<Duration>, call: F) -> Result<T, BackendError>
where
    F: Future<Output = Result<T, BackendError>>,
{
    match limit {
        Some(limit) => tokio::time::timeout(limit, call)
            .await
            .unwrap_or_else(|_| Err(BackendError::Timeout(limit))),
        None => call.await,
    }
}
