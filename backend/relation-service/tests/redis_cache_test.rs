//! Redis membership cache tests
//!
//! Run against a disposable Redis:
//! REDIS_URL=redis://127.0.0.1:6379 cargo test -- --ignored

mod common;

use common::InMemoryEdgeStore;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use relation_service::cache::{CacheKey, RedisRelationshipCache, RelationshipCache, SharedRedis};
use relation_service::{RelationService, RelationshipStore, RequestContext};
use serial_test::serial;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use uuid::Uuid;

async fn create_test_redis() -> SharedRedis {
    let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());
    let client = redis::Client::open(url).expect("Invalid REDIS_URL");
    let manager = ConnectionManager::new(client)
        .await
        .expect("Failed to connect to Redis");
    Arc::new(Mutex::new(manager))
}

async fn raw_get(redis: &SharedRedis, key: &str) -> Option<String> {
    let mut conn = redis.lock().await;
    conn.get(key).await.expect("GET")
}

#[tokio::test]
#[serial]
#[ignore] // Requires Redis
async fn test_set_get_invalidate() {
    let redis = create_test_redis().await;
    let cache = RedisRelationshipCache::new(redis.clone());
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
    let ttl = Duration::from_secs(60);

    assert_eq!(cache.get(a, b).await.unwrap(), None);

    cache.set(a, b, true, ttl).await.unwrap();
    assert_eq!(cache.get(a, b).await.unwrap(), Some(true));
    assert_eq!(
        raw_get(&redis, &CacheKey::follows(a, b)).await.as_deref(),
        Some("1")
    );
    assert_eq!(cache.get(b, a).await.unwrap(), None);

    cache.set(a, b, false, ttl).await.unwrap();
    assert_eq!(cache.get(a, b).await.unwrap(), Some(false));
    assert_eq!(
        raw_get(&redis, &CacheKey::follows(a, b)).await.as_deref(),
        Some("0")
    );

    cache.invalidate(a, b).await.unwrap();
    assert_eq!(cache.get(a, b).await.unwrap(), None);
    assert_eq!(raw_get(&redis, &CacheKey::follows(a, b)).await, None);

    // Deleting a missing key is not an error
    cache.invalidate(a, b).await.unwrap();
}

#[tokio::test]
#[serial]
#[ignore] // Requires Redis
async fn test_set_applies_ttl() {
    let redis = create_test_redis().await;
    let cache = RedisRelationshipCache::new(redis.clone());
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

    cache.set(a, b, true, Duration::from_secs(30)).await.unwrap();
    let ttl: i64 = {
        let mut conn = redis.lock().await;
        conn.ttl(CacheKey::follows(a, b)).await.expect("TTL")
    };
    assert!(ttl > 0 && ttl <= 30, "unexpected ttl {ttl}");

    cache.set(a, b, true, Duration::from_secs(1)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(2100)).await;
    assert_eq!(cache.get(a, b).await.unwrap(), None);
}

#[tokio::test]
#[serial]
#[ignore] // Requires Redis
async fn test_unknown_payload_reads_as_miss() {
    let redis = create_test_redis().await;
    let cache = RedisRelationshipCache::new(redis.clone());
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

    {
        let mut conn = redis.lock().await;
        conn.set_ex::<_, _, ()>(CacheKey::follows(a, b), "garbage", 60)
            .await
            .expect("SET EX");
    }

    assert_eq!(cache.get(a, b).await.unwrap(), None);
    cache.invalidate(a, b).await.unwrap();
}

#[tokio::test]
#[serial]
#[ignore] // Requires Redis
async fn test_follow_lifecycle_through_store() {
    let redis = create_test_redis().await;
    let edges = Arc::new(InMemoryEdgeStore::new());
    let cache = Arc::new(RedisRelationshipCache::new(redis.clone()));
    let store = Arc::new(RelationshipStore::new(edges.clone(), cache.clone()));
    let service = RelationService::new(store);
    let ctx = RequestContext::background();
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

    service.follow(&ctx, a, b).await.unwrap();
    assert_eq!(cache.get(a, b).await.unwrap(), Some(true));

    let calls = edges.calls();
    assert!(service.is_following(&ctx, a, b).await.unwrap());
    assert_eq!(edges.calls(), calls, "served from Redis");

    service.unfollow(&ctx, a, b).await.unwrap();
    assert_eq!(cache.get(a, b).await.unwrap(), None);
    assert!(!service.is_following(&ctx, a, b).await.unwrap());
    assert_eq!(cache.get(a, b).await.unwrap(), Some(false));

    cache.invalidate(a, b).await.unwrap();
}
