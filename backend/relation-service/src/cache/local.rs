//! In-process membership cache
//!
//! Used when Redis is disabled or unreachable at startup. Entries carry their
//! own TTL so `set` behaves like `SET EX`.

use super::{CacheResult, RelationshipCache};
use moka::future::Cache;
use moka::Expiry;
use std::time::{Duration, Instant};
use uuid::Uuid;

#[derive(Debug, Clone, Copy)]
struct CachedFlag {
    is_following: bool,
    ttl: Duration,
}

struct FlagExpiry;

impl Expiry<(Uuid, Uuid), CachedFlag> for FlagExpiry {
    fn expire_after_create(
        &self,
        _key: &(Uuid, Uuid),
        value: &CachedFlag,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    // Overwrites reset the TTL, matching SET EX.
    fn expire_after_update(
        &self,
        _key: &(Uuid, Uuid),
        value: &CachedFlag,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

#[derive(Clone)]
pub struct LocalRelationshipCache {
    cache: Cache<(Uuid, Uuid), CachedFlag>,
}

impl LocalRelationshipCache {
    pub fn new(max_entries: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .expire_after(FlagExpiry)
            .build();
        Self { cache }
    }
}

#[async_trait::async_trait]
impl RelationshipCache for LocalRelationshipCache {
    async fn get(&self, follower_id: Uuid, following_id: Uuid) -> CacheResult<Option<bool>> {
        Ok(self
            .cache
            .get(&(follower_id, following_id))
            .await
            .map(|flag| flag.is_following))
    }

    async fn set(
        &self,
        follower_id: Uuid,
        following_id: Uuid,
        is_following: bool,
        ttl: Duration,
    ) -> CacheResult<()> {
        self.cache
            .insert(
                (follower_id, following_id),
                CachedFlag { is_following, ttl },
            )
            .await;
        Ok(())
    }

    async fn invalidate(&self, follower_id: Uuid, following_id: Uuid) -> CacheResult<()> {
        self.cache.invalidate(&(follower_id, following_id)).await;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "local"
    }
}
