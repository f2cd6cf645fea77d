//! In-memory fakes for exercising the relationship store without Postgres or Redis.

#![allow(dead_code)]

use relation_service::cache::{CacheError, CacheResult, LocalRelationshipCache, RelationshipCache};
use relation_service::{
    Edge, EdgeStore, EdgeWithUser, ListQuery, RelationService, RelationshipStore, StoreError,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

#[derive(Default)]
struct EdgeTable {
    edges: Vec<Edge>,
    users: HashMap<Uuid, (String, String)>,
}

/// Edge store backed by a mutex-guarded vector.
///
/// `insert` enforces the active-pair uniqueness the real unique index provides.
#[derive(Default)]
pub struct InMemoryEdgeStore {
    table: Mutex<EdgeTable>,
    calls: AtomicUsize,
    fail: AtomicBool,
    /// Makes `find_active` report nothing, as if a concurrent insert was not yet visible.
    blind_precheck: AtomicBool,
    delay: Mutex<Option<Duration>>,
}

impl InMemoryEdgeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user in the identity projection used for joins.
    pub fn add_user(&self, id: Uuid, name: &str, username: &str) {
        self.table
            .lock()
            .unwrap()
            .users
            .insert(id, (name.to_string(), username.to_string()));
    }

    /// Number of calls made against the store so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn set_blind_precheck(&self, blind: bool) {
        self.blind_precheck.store(blind, Ordering::SeqCst);
    }

    pub fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.lock().unwrap() = delay;
    }

    pub fn active_count(&self, follower_id: Uuid, following_id: Uuid) -> usize {
        self.table
            .lock()
            .unwrap()
            .edges
            .iter()
            .filter(|e| e.is_active() && e.follower_id == follower_id && e.following_id == following_id)
            .count()
    }

    async fn enter(&self) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected failure".to_string()));
        }
        Ok(())
    }

    fn list(
        &self,
        query: &ListQuery,
        select: impl Fn(&Edge) -> Option<Uuid>,
    ) -> Vec<EdgeWithUser> {
        let table = self.table.lock().unwrap();
        let mut rows: Vec<EdgeWithUser> = table
            .edges
            .iter()
            .filter(|e| e.is_active())
            .filter_map(|e| {
                let counterpart = select(e)?;
                let (name, username) = table.users.get(&counterpart)?.clone();
                Some(EdgeWithUser {
                    id: e.id,
                    follower_id: e.follower_id,
                    following_id: e.following_id,
                    name,
                    username,
                    created_at: e.created_at,
                })
            })
            .filter(|row| query.matches_name(&row.name))
            .collect();

        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        rows.into_iter()
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .collect()
    }
}

#[async_trait::async_trait]
impl EdgeStore for InMemoryEdgeStore {
    async fn find_active(
        &self,
        follower_id: Uuid,
        following_id: Uuid,
    ) -> Result<Option<Edge>, StoreError> {
        self.enter().await?;
        if self.blind_precheck.load(Ordering::SeqCst) {
            return Ok(None);
        }
        Ok(self
            .table
            .lock()
            .unwrap()
            .edges
            .iter()
            .find(|e| e.is_active() && e.follower_id == follower_id && e.following_id == following_id)
            .cloned())
    }

    async fn insert(&self, edge: &Edge) -> Result<(), StoreError> {
        self.enter().await?;
        let mut table = self.table.lock().unwrap();
        let duplicate = table.edges.iter().any(|e| {
            e.is_active() && e.follower_id == edge.follower_id && e.following_id == edge.following_id
        });
        if duplicate {
            return Err(StoreError::UniqueViolation);
        }
        table.edges.push(edge.clone());
        Ok(())
    }

    async fn delete(&self, follower_id: Uuid, following_id: Uuid) -> Result<u64, StoreError> {
        self.enter().await?;
        let mut table = self.table.lock().unwrap();
        let before = table.edges.len();
        table.edges.retain(|e| {
            !(e.is_active() && e.follower_id == follower_id && e.following_id == following_id)
        });
        Ok((before - table.edges.len()) as u64)
    }

    async fn list_followers(
        &self,
        user_id: Uuid,
        query: &ListQuery,
    ) -> Result<Vec<EdgeWithUser>, StoreError> {
        self.enter().await?;
        Ok(self.list(query, |e| (e.following_id == user_id).then_some(e.follower_id)))
    }

    async fn list_followings(
        &self,
        user_id: Uuid,
        query: &ListQuery,
    ) -> Result<Vec<EdgeWithUser>, StoreError> {
        self.enter().await?;
        Ok(self.list(query, |e| (e.follower_id == user_id).then_some(e.following_id)))
    }
}

/// Cache whose every call fails, standing in for an unreachable Redis.
#[derive(Default)]
pub struct FailingCache {
    pub calls: AtomicUsize,
}

#[async_trait::async_trait]
impl RelationshipCache for FailingCache {
    async fn get(&self, _follower_id: Uuid, _following_id: Uuid) -> CacheResult<Option<bool>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(CacheError::Unavailable("connection refused".to_string()))
    }

    async fn set(
        &self,
        _follower_id: Uuid,
        _following_id: Uuid,
        _is_following: bool,
        _ttl: Duration,
    ) -> CacheResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(CacheError::Unavailable("connection refused".to_string()))
    }

    async fn invalidate(&self, _follower_id: Uuid, _following_id: Uuid) -> CacheResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(CacheError::Unavailable("connection refused".to_string()))
    }

    fn backend(&self) -> &'static str {
        "failing"
    }
}

pub struct Harness {
    pub edges: Arc<InMemoryEdgeStore>,
    pub cache: Arc<LocalRelationshipCache>,
    pub store: Arc<RelationshipStore>,
    pub service: RelationService,
}

/// Store and service wired over the in-memory edge store and local cache.
pub fn harness() -> Harness {
    let edges = Arc::new(InMemoryEdgeStore::new());
    let cache = Arc::new(LocalRelationshipCache::new(10_000));
    let store = Arc::new(RelationshipStore::new(edges.clone(), cache.clone()));
    let service = RelationService::new(store.clone());
    Harness {
        edges,
        cache,
        store,
        service,
    }
}

/// Store and service wired over the in-memory edge store and an always-failing cache.
pub fn harness_with_failing_cache() -> (Arc<InMemoryEdgeStore>, Arc<FailingCache>, RelationService) {
    let edges = Arc::new(InMemoryEdgeStore::new());
    let cache = Arc::new(FailingCache::default());
    let store = Arc::new(RelationshipStore::new(edges.clone(), cache.clone()));
    (edges, cache, RelationService::new(store))
}
