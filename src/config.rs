//! Configuration Module
//!
//! Handles loading facade and backend settings from environment variables,
//! and the per-namespace settings used when creating named caches.

use std::env;
use std::time::Duration;

use serde::Deserialize;

use crate::cache::EvictionPolicy;

/// Facade and in-process backend configuration.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct FacadeConfig {
    /// Maximum number of entries the in-process backend can hold
    pub max_entries: usize,
    /// Deadline applied to every facade operation, None = unbounded
    pub operation_timeout: Option<Duration>,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
    /// Pretty-print encoded JSON values
    pub pretty_json: bool,
    /// Prefix prepended to every key written to Redis
    pub key_prefix: String,
    /// Redis connection URL
    pub redis_url: String,
}

impl FacadeConfig {
    /// Creates a new FacadeConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_MAX_ENTRIES` - In-process backend capacity, 0 falls back to the default (default: 10000)
    /// - `CACHE_OPERATION_TIMEOUT_MS` - Per-operation deadline, 0 disables (default: 5000)
    /// - `CACHE_CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 1)
    /// - `CACHE_PRETTY_JSON` - Pretty-print encoded values (default: false)
    /// - `CACHE_KEY_PREFIX` - Redis key prefix (default: "cache")
    /// - `REDIS_URL` - Redis connection URL (default: "redis://127.0.0.1:6379")
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let timeout_ms: u64 = env::var("CACHE_OPERATION_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_OPERATION_TIMEOUT_MS);

        Self {
            // A zero-capacity backend would refuse every write
            max_entries: env::var("CACHE_MAX_ENTRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&n: &usize| n > 0)
                .unwrap_or(defaults.max_entries),
            operation_timeout: (timeout_ms > 0).then(|| Duration::from_millis(timeout_ms)),
            cleanup_interval: env::var("CACHE_CLEANUP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cleanup_interval),
            pretty_json: env::var("CACHE_PRETTY_JSON")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.pretty_json),
            key_prefix: env::var("CACHE_KEY_PREFIX").unwrap_or(defaults.key_prefix),
            redis_url: env::var("REDIS_URL").unwrap_or(defaults.redis_url),
        }
    }
}

const DEFAULT_OPERATION_TIMEOUT_MS: u64 = 5000;

impl Default for FacadeConfig {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            operation_timeout: Some(Duration::from_millis(DEFAULT_OPERATION_TIMEOUT_MS)),
            cleanup_interval: 1,
            pretty_json: false,
            key_prefix: "cache".to_string(),
            redis_url: "redis://127.0.0.1:6379".to_string(),
        }
    }
}

// == Named Cache Config ==
/// Settings of one named cache, fixed when the cache is created.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NamedCacheConfig {
    /// Maximum number of entries
    pub capacity: usize,
    /// TTL in seconds for entries written without one, None = never expire
    pub default_ttl: Option<u64>,
    /// What to drop when the cache is full
    pub eviction: EvictionPolicy,
}

impl NamedCacheConfig {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    pub fn with_default_ttl(mut self, seconds: u64) -> Self {
        self.default_ttl = Some(seconds);
        self
    }

    pub fn with_eviction(mut self, eviction: EvictionPolicy) -> Self {
        self.eviction = eviction;
        self
    }

    /// Returns an error message if the config cannot back a cache.
    pub fn validate(&self) -> Option<String> {
        if self.capacity == 0 {
            return Some("Cache capacity must be greater than zero".to_string());
        }
        if self.default_ttl == Some(0) {
            return Some("Default TTL must be greater than zero".to_string());
        }
        None
    }

    pub(crate) fn default_ttl_duration(&self) -> Option<Duration> {
        self.default_ttl.map(Duration::from_secs)
    }
}

impl Default for NamedCacheConfig {
    fn default() -> Self {
        Self {
            capacity: 1000,
            default_ttl: None,
            eviction: EvictionPolicy::Lru,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = FacadeConfig::default();
        assert_eq!(config.max_entries, 10_000);
        assert_eq!(config.operation_timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.cleanup_interval, 1);
        assert!(!config.pretty_json);
        assert_eq!(config.key_prefix, "cache");
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("CACHE_MAX_ENTRIES");
        env::remove_var("CACHE_OPERATION_TIMEOUT_MS");
        env::remove_var("CACHE_CLEANUP_INTERVAL");
        env::remove_var("CACHE_PRETTY_JSON");
        env::remove_var("CACHE_KEY_PREFIX");
        env::remove_var("REDIS_URL");

        let config = FacadeConfig::from_env();
        assert_eq!(config.max_entries, 10_000);
        assert_eq!(config.operation_timeout, Some(Duration::from_millis(5000)));
        assert_eq!(config.cleanup_interval, 1);
        assert_eq!(config.redis_url, "redis://127.0.0.1:6379");

        // Kept in this test since env vars are process-wide
        env::set_var("CACHE_MAX_ENTRIES", "0");
        assert_eq!(FacadeConfig::from_env().max_entries, 10_000);

        env::set_var("CACHE_MAX_ENTRIES", "25");
        assert_eq!(FacadeConfig::from_env().max_entries, 25);
        env::remove_var("CACHE_MAX_ENTRIES");
    }

    #[test]
    fn test_named_config_deserialize() {
        let json = r#"{"capacity": 50, "default_ttl": 30, "eviction": "lfu"}"#;
        let config: NamedCacheConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.capacity, 50);
        assert_eq!(config.default_ttl, Some(30));
        assert_eq!(config.eviction, EvictionPolicy::Lfu);
    }

    #[test]
    fn test_named_config_deserialize_fills_defaults() {
        let config: NamedCacheConfig = serde_json::from_str(r#"{"eviction": "none"}"#).unwrap();
        assert_eq!(config.capacity, 1000);
        assert_eq!(config.default_ttl, None);
        assert_eq!(config.eviction, EvictionPolicy::None);
    }

    #[test]
    fn test_named_config_validate() {
        assert!(NamedCacheConfig::new(10).validate().is_none());
        assert!(NamedCacheConfig::new(0).validate().is_some());
        assert!(NamedCacheConfig::new(10)
            .with_default_ttl(0)
            .validate()
            .is_some());
    }
}
