//! In-process cache store built on Moka.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::sync::Cache;
use tracing::debug;

use super::{CacheConfig, CacheStore};
use crate::error::StoreError;

/// A cached blob with an optional deadline.
///
/// The data is wrapped in `Arc` so hits are cheap to clone out of Moka.
#[derive(Clone, Debug)]
struct CachedBlob {
    data: Arc<Vec<u8>>,
    expires_at: Option<Instant>,
}

impl CachedBlob {
    fn new(data: Vec<u8>, ttl: Option<Duration>) -> Self {
        Self {
            data: Arc::new(data),
            expires_at: ttl.map(|ttl| Instant::now() + ttl),
        }
    }

    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|deadline| Instant::now() >= deadline)
    }
}

/// In-process cache store.
///
/// This cache is:
/// - Thread-safe (Moka handles its own synchronization)
/// - Size-bounded, with per-entry TTL checked on read
/// - Clone-friendly (cloning shares the same underlying cache)
#[derive(Clone)]
pub struct LocalCacheStore {
    inner: Cache<String, CachedBlob>,
}

impl LocalCacheStore {
    /// Create a new local cache with the given config.
    pub fn new(config: CacheConfig) -> Self {
        Self {
            inner: Cache::builder().max_capacity(config.max_capacity).build(),
        }
    }

    /// Get the number of entries in the cache.
    ///
    /// Note: This may not be perfectly accurate due to concurrent operations.
    #[cfg(test)]
    pub fn entry_count(&self) -> u64 {
        self.inner.run_pending_tasks();
        self.inner.entry_count()
    }
}

#[async_trait]
impl CacheStore for LocalCacheStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        match self.inner.get(key) {
            Some(blob) if blob.is_expired() => {
                self.inner.invalidate(key);
                debug!(key = %key, "cache entry expired (local)");
                Ok(None)
            }
            Some(blob) => Ok(Some(blob.data.as_ref().clone())),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> Result<(), StoreError> {
        self.inner.insert(key.to_string(), CachedBlob::new(value, ttl));
        debug!(key = %key, ttl = ?ttl, "cache set (local)");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.inner.invalidate(key);
        debug!(key = %key, "cache invalidated (local)");
        Ok(())
    }
}

impl std::fmt::Debug for LocalCacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalCacheStore")
            .field("entry_count", &self.inner.entry_count())
            .finish()
    }
}
