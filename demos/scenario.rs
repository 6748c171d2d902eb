//! Cache Facade walkthrough
//!
//! Wires the facade to the in-process backend and registry, runs a short
//! session against it and shuts the cleanup tasks down.
//!
//! Run with `cargo run --example scenario`; set `RUST_LOG=cache_facade=debug`
//! to see every operation.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cache_facade::{
    spawn_cleanup_task, CacheError, CacheFacade, EvictionPolicy, FacadeConfig, MemoryBackend,
    MemoryRegistry, NamedCacheConfig,
};

#[tokio::main]
async fn main() -> Result<(), CacheError> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cache_facade=info,scenario=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = FacadeConfig::from_env();
    info!(
        "Configuration loaded: max_entries={}, operation_timeout={:?}, cleanup_interval={}s",
        config.max_entries, config.operation_timeout, config.cleanup_interval
    );

    let backend = Arc::new(MemoryBackend::from_config(&config));
    let registry = Arc::new(MemoryRegistry::new());
    let backend_cleanup = spawn_cleanup_task(backend.clone(), config.cleanup_interval);
    let registry_cleanup = spawn_cleanup_task(registry.clone(), config.cleanup_interval);

    let facade = CacheFacade::from_config(&config, backend, registry);

    // Key operations
    facade.save("user:1", &json!({"name": "Ann"})).await?;
    let user: Option<Value> = facade.get("user:1").await?;
    info!("user:1 = {:?}", user);

    match facade.set_expire("user:1", 0).await {
        Err(e) => warn!("Rejected as expected: {}", e),
        Ok(()) => warn!("Zero TTL was accepted"),
    }

    facade.save_with_expire("otp:1", "493021", 60).await?;
    facade.update("otp:1", "118342").await?;
    info!("otp:1 ttl = {:?}", facade.ttl("otp:1").await?);

    facade.delete("user:1").await?;
    info!("user:1 after delete = {:?}", facade.get::<serde_json::Value>("user:1").await?);

    // Named caches
    let config = NamedCacheConfig::new(500)
        .with_default_ttl(300)
        .with_eviction(EvictionPolicy::Lfu);
    let outcome = facade.create_cache("sessions", config.clone()).await?;
    info!("create_cache(sessions) -> {:?}", outcome);

    if let Some(sessions) = facade.get_cache("sessions").await? {
        sessions.put("s-1", &json!({"user": 1})).await?;
        info!("sessions holds {} entries", sessions.len().await?);
    }

    let outcome = facade.create_cache("sessions", config).await?;
    info!("create_cache(sessions) again -> {:?}", outcome);

    let cleared = facade.clear_all_cache().await?;
    info!("Cleared {} named caches", cleared);

    backend_cleanup.abort();
    registry_cleanup.abort();
    warn!("Cleanup tasks aborted");

    Ok(())
}
