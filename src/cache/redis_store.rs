//! Redis-backed cache store.

use std::time::Duration;

use async_trait::async_trait;
use deadpool_redis::{Pool, Runtime};
use redis::AsyncCommands;
use tracing::{debug, info};

use super::CacheStore;
use crate::error::StoreError;

/// Cache store shared across service instances.
#[derive(Clone)]
pub struct RedisCacheStore {
    pool: Pool,
}

impl RedisCacheStore {
    /// Create a pool for `url` and verify that a connection can be made.
    ///
    /// # Errors
    /// Returns error if the pool cannot be built or Redis is unreachable.
    pub async fn connect(url: &str, pool_size: usize, timeout: Duration) -> Result<Self, StoreError> {
        info!(url = %url, "Connecting to Redis");

        let mut redis_config = deadpool_redis::Config::from_url(url);
        let mut pool_config = deadpool_redis::PoolConfig::new(pool_size);
        pool_config.timeouts.wait = Some(timeout);
        pool_config.timeouts.create = Some(timeout);
        pool_config.timeouts.recycle = Some(timeout);
        redis_config.pool = Some(pool_config);

        let pool = redis_config
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| StoreError::Other(format!("failed to create Redis pool: {e}")))?;

        // Test connection
        let mut conn = pool.get().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;

        info!("Connected to Redis");
        Ok(Self { pool })
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let mut conn = self.pool.get().await?;
        let value: Option<Vec<u8>> = conn.get(key).await?;
        debug!(key = %key, hit = value.is_some(), "cache get (redis)");
        Ok(value)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await?;
        match ttl {
            // SETEX needs at least one second.
            Some(ttl) => conn.set_ex::<_, _, ()>(key, value, ttl.as_secs().max(1)).await?,
            None => conn.set::<_, _, ()>(key, value).await?,
        }
        debug!(key = %key, ttl = ?ttl, "cache set (redis)");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await?;
        let removed: u64 = conn.del(key).await?;
        debug!(key = %key, removed, "cache invalidated (redis)");
        Ok(())
    }
}

impl std::fmt::Debug for RedisCacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = self.pool.status();
        f.debug_struct("RedisCacheStore")
            .field("pool_size", &status.size)
            .field("available", &status.available)
            .finish()
    }
}
