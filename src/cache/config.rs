//! Cache configuration.

use std::time::Duration;

use crate::config::Config;

/// Configuration for the cache store.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of entries in the in-process cache.
    pub max_capacity: u64,

    /// Redis URL. `None` selects the in-process cache.
    pub redis_url: Option<String>,

    /// Redis connection pool size.
    pub pool_size: usize,

    /// Wait/create/recycle timeout for pooled Redis connections.
    pub timeout: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 1_024,
            redis_url: None,
            pool_size: 8,
            timeout: Duration::from_secs(5),
        }
    }
}

impl CacheConfig {
    /// Derive the cache configuration from the application config.
    pub fn from_app(config: &Config) -> Self {
        Self {
            max_capacity: config.cache_capacity,
            redis_url: config.redis_url.clone(),
            pool_size: config.redis_pool_size,
            timeout: config.store_timeout,
        }
    }
}
