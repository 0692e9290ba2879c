//! Cache store adapters.
//!
//! The read coordinator talks to a `CacheStore`: a blob store keyed by
//! string with optional per-entry TTL. Two backends exist:
//! - `LocalCacheStore` - in-process, built on Moka
//! - `RedisCacheStore` - shared across instances, built on deadpool-redis
//!
//! ## Usage
//!
//! ```rust
//! let cache: Arc<dyn CacheStore> = Arc::new(LocalCacheStore::new(CacheConfig::default()));
//! cache.set("recipes", bytes, None).await?;
//! let hit = cache.get("recipes").await?; // Ok(None) when absent
//! ```

mod config;
mod local;
mod redis_store;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

pub use config::CacheConfig;
pub use local::LocalCacheStore;
pub use redis_store::RedisCacheStore;

use crate::error::StoreError;

/// Blob store used by the cache-aside read path.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Read a blob. `Ok(None)` means the key is absent.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Write a blob. `ttl = None` keeps it until deleted.
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> Result<(), StoreError>;

    /// Remove a key. Removing an absent key succeeds.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}

/// Build the cache store described by `config`.
///
/// Redis is used when a URL is configured and reachable; otherwise the
/// in-process cache is used.
pub async fn connect(config: &CacheConfig) -> Arc<dyn CacheStore> {
    let Some(url) = &config.redis_url else {
        info!("REDIS_URL not set, using in-process cache");
        return Arc::new(LocalCacheStore::new(config.clone()));
    };

    match RedisCacheStore::connect(url, config.pool_size, config.timeout).await {
        Ok(store) => Arc::new(store),
        Err(e) => {
            warn!(error = %e, "Failed to connect to Redis, falling back to in-process cache");
            Arc::new(LocalCacheStore::new(config.clone()))
        }
    }
}
