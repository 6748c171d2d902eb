//! Cache Facade - typed caching over pluggable key-value backends
//!
//! Provides save/get/update/delete/expire operations over any [`CacheBackend`]
//! and create-or-clear management of named caches over any
//! [`NamedCacheRegistry`]. Ships an in-process backend and registry with TTL
//! expiration and LRU/LFU eviction, and a Redis backend behind the
//! `redis-backend` feature.

pub mod backend;
pub mod cache;
pub mod clock;
pub mod codec;
pub mod config;
pub mod error;
pub mod facade;
pub mod registry;
pub mod tasks;

pub use backend::{CacheBackend, KeyTtl, MemoryBackend};
pub use cache::EvictionPolicy;
pub use clock::{Clock, ManualClock, SystemClock};
pub use codec::{Codec, JsonCodec};
pub use config::{FacadeConfig, NamedCacheConfig};
pub use error::{BackendError, CacheError, Result};
pub use facade::{CacheFacade, CreateOutcome};
pub use registry::{CacheHandle, MemoryRegistry, NamedCache, NamedCacheRegistry};
pub use tasks::spawn_cleanup_task;

#[cfg(feature = "redis-backend")]
pub use backend::RedisBackend;
