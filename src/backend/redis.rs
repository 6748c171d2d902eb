//! Redis backend using a multiplexed async connection.
//!
//! Needs Redis 6.2 or newer for `SET ... KEEPTTL GET` and `GETDEL`.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{Client, RedisError};
use tracing::info;

use crate::backend::{CacheBackend, KeyTtl};
use crate::config::FacadeConfig;
use crate::error::BackendError;

/// Redis-based backend. Every key is stored as `<key_prefix>:<key>`.
#[derive(Clone)]
pub struct RedisBackend {
    conn: MultiplexedConnection,
    key_prefix: String,
}

impl RedisBackend {
    /// Opens a connection to `url`.
    pub async fn connect(url: &str, key_prefix: impl Into<String>) -> Result<Self, BackendError> {
        let client = Client::open(url).map_err(|e| BackendError::Connection(e.to_string()))?;
        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| BackendError::Connection(e.to_string()))?;

        let key_prefix = key_prefix.into();
        info!("Connected to Redis backend with key prefix '{}'", key_prefix);

        Ok(Self { conn, key_prefix })
    }

    pub async fn from_config(config: &FacadeConfig) -> Result<Self, BackendError> {
        Self::connect(&config.redis_url, config.key_prefix.clone()).await
    }

    fn prefixed_key(&self, key: &str) -> String {
        format!("{}:{}", self.key_prefix, key)
    }
}

fn map_redis_error(e: RedisError) -> BackendError {
    if e.is_io_error() || e.is_connection_refusal() || e.is_connection_dropped() || e.is_timeout() {
        BackendError::Connection(e.to_string())
    } else {
        BackendError::Operation(e.to_string())
    }
}

/// Longest expiry sent to Redis. Redis adds the current time to PX and
/// rejects anything that overflows a signed 64-bit integer.
const MAX_TTL_MS: u64 = (i64::MAX / 2) as u64;

fn millis(ttl: Duration) -> u64 {
    // Redis rejects a zero PX, so round sub-millisecond TTLs up
    u64::try_from(ttl.as_millis())
        .unwrap_or(u64::MAX)
        .clamp(1, MAX_TTL_MS)
}

#[async_trait]
impl CacheBackend for RedisBackend {
    async fn set_raw(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Option<Duration>,
    ) -> Result<(), BackendError> {
        let mut conn = self.conn.clone();
        let mut cmd = redis::cmd("SET");
        cmd.arg(self.prefixed_key(key)).arg(value);
        if let Some(ttl) = ttl {
            cmd.arg("PX").arg(millis(ttl));
        }

        let _: () = cmd.query_async(&mut conn).await.map_err(map_redis_error)?;
        Ok(())
    }

    async fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError> {
        let mut conn = self.conn.clone();
        redis::cmd("GET")
            .arg(self.prefixed_key(key))
            .query_async(&mut conn)
            .await
            .map_err(map_redis_error)
    }

    async fn get_and_set_raw(
        &self,
        key: &str,
        value: Vec<u8>,
    ) -> Result<Option<Vec<u8>>, BackendError> {
        let mut conn = self.conn.clone();
        redis::cmd("SET")
            .arg(self.prefixed_key(key))
            .arg(value)
            .arg("KEEPTTL")
            .arg("GET")
            .query_async(&mut conn)
            .await
            .map_err(map_redis_error)
    }

    async fn get_and_delete_raw(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError> {
        let mut conn = self.conn.clone();
        redis::cmd("GETDEL")
            .arg(self.prefixed_key(key))
            .query_async(&mut conn)
            .await
            .map_err(map_redis_error)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, BackendError> {
        let mut conn = self.conn.clone();
        let updated: i64 = redis::cmd("PEXPIRE")
            .arg(self.prefixed_key(key))
            .arg(millis(ttl))
            .query_async(&mut conn)
            .await
            .map_err(map_redis_error)?;
        Ok(updated == 1)
    }

    async fn ttl(&self, key: &str) -> Result<KeyTtl, BackendError> {
        let mut conn = self.conn.clone();
        let remaining: i64 = redis::cmd("PTTL")
            .arg(self.prefixed_key(key))
            .query_async(&mut conn)
            .await
            .map_err(map_redis_error)?;

        Ok(match remaining {
            -2 => KeyTtl::Missing,
            -1 => KeyTtl::Persistent,
            ms => KeyTtl::Expires(Duration::from_millis(ms.max(0) as u64)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_millis_rounds_up_sub_millisecond() {
        assert_eq!(millis(Duration::from_micros(10)), 1);
        assert_eq!(millis(Duration::from_secs(2)), 2000);
    }

    #[test]
    fn test_millis_caps_huge_ttl() {
        assert_eq!(millis(Duration::from_secs(u64::MAX)), MAX_TTL_MS);
        assert!(millis(Duration::from_secs(u64::MAX)) <= i64::MAX as u64);
    }

    #[tokio::test]
    async fn test_connect_rejects_bad_url() {
        let result = RedisBackend::connect("not-a-url", "cache").await;
        assert!(matches!(result, Err(BackendError::Connection(_))));
    }
}
