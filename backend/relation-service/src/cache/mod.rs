//! Relationship membership cache
//!
//! A derived accelerator in front of the edge store. Values are tri-state:
//! `Some(true)`, `Some(false)`, or `None` when unknown. Every failure here is
//! absorbed by the caller.

mod keys;
mod local;
mod redis_cache;

pub use keys::{CacheKey, CACHE_VERSION};
pub use local::LocalRelationshipCache;
pub use redis_cache::{RedisRelationshipCache, SharedRedis};

use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Default TTL values
pub mod ttl {
    use std::time::Duration;

    /// Membership flags expire after ten minutes
    pub const FOLLOWS: Duration = Duration::from_secs(600);
}

/// Cache failures; never surfaced to callers of the relationship store.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Cache unavailable: {0}")]
    Unavailable(String),
}

pub type CacheResult<T> = Result<T, CacheError>;

/// Key-value cache of ordered-pair membership flags
#[async_trait::async_trait]
pub trait RelationshipCache: Send + Sync {
    /// Cached membership for the pair, `None` when absent or expired
    async fn get(&self, follower_id: Uuid, following_id: Uuid) -> CacheResult<Option<bool>>;

    /// Store membership for the pair with the given TTL
    async fn set(
        &self,
        follower_id: Uuid,
        following_id: Uuid,
        is_following: bool,
        ttl: Duration,
    ) -> CacheResult<()>;

    /// Remove the entry for the pair
    async fn invalidate(&self, follower_id: Uuid, following_id: Uuid) -> CacheResult<()>;

    /// Backend label for logs
    fn backend(&self) -> &'static str;
}

/// Decode a stored membership flag. Unknown payloads read as a miss.
pub(crate) fn decode_flag(value: &str) -> Option<bool> {
    match value {
        "1" | "true" => Some(true),
        "0" | "false" => Some(false),
        _ => None,
    }
}

pub(crate) fn encode_flag(is_following: bool) -> &'static str {
    if is_following {
        "1"
    } else {
        "0"
    }
}
