//! Redis-backed membership cache

use super::{decode_flag, encode_flag, CacheError, CacheKey, CacheResult, RelationshipCache};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

/// Shared Redis connection manager guarded by a Tokio mutex.
pub type SharedRedis = Arc<Mutex<ConnectionManager>>;

/// Membership flags stored as `"1"` / `"0"` strings with `SET EX`.
#[derive(Clone)]
pub struct RedisRelationshipCache {
    redis: SharedRedis,
}

impl RedisRelationshipCache {
    pub fn new(redis: SharedRedis) -> Self {
        Self { redis }
    }

    /// Open a connection manager for `redis_url` and verify it with PING.
    pub async fn connect(redis_url: &str) -> CacheResult<Self> {
        let client = redis::Client::open(redis_url)?;
        let mut manager = ConnectionManager::new(client).await?;
        redis::cmd("PING")
            .query_async::<_, String>(&mut manager)
            .await?;
        Ok(Self::new(Arc::new(Mutex::new(manager))))
    }
}

#[async_trait::async_trait]
impl RelationshipCache for RedisRelationshipCache {
    async fn get(&self, follower_id: Uuid, following_id: Uuid) -> CacheResult<Option<bool>> {
        let key = CacheKey::follows(follower_id, following_id);
        let mut conn = self.redis.lock().await;
        let raw: Option<String> = conn.get(&key).await.map_err(CacheError::Redis)?;

        match raw {
            Some(value) => match decode_flag(&value) {
                Some(flag) => Ok(Some(flag)),
                None => {
                    // Invalid data, treat as miss
                    warn!(key = %key, value = %value, "Invalid follows cache value");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    async fn set(
        &self,
        follower_id: Uuid,
        following_id: Uuid,
        is_following: bool,
        ttl: Duration,
    ) -> CacheResult<()> {
        let key = CacheKey::follows(follower_id, following_id);
        // SET EX rejects a zero expiry
        let ttl_secs = ttl.as_secs().max(1);

        let mut conn = self.redis.lock().await;
        conn.set_ex::<_, _, ()>(&key, encode_flag(is_following), ttl_secs)
            .await
            .map_err(CacheError::Redis)?;

        debug!(
            follower = %follower_id,
            following = %following_id,
            is_following = is_following,
            ttl = ttl_secs,
            "Cached follows flag"
        );
        Ok(())
    }

    async fn invalidate(&self, follower_id: Uuid, following_id: Uuid) -> CacheResult<()> {
        let key = CacheKey::follows(follower_id, following_id);
        let mut conn = self.redis.lock().await;
        conn.del::<_, ()>(&key).await.map_err(CacheError::Redis)?;

        debug!(key = %key, "Cache delete");
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}
