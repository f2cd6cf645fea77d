//! Relationship store
//!
//! Composes the durable edge store with the membership cache. Writes go to
//! the edge store first and then refresh (follow) or invalidate (unfollow)
//! the cache; reads of a single pair go cache-first. Cache failures are
//! logged and absorbed, they never change an outcome.

use super::EdgeStore;
use crate::cache::{ttl, RelationshipCache};
use crate::context::RequestContext;
use crate::domain::edge::{Edge, EdgeWithUser, ListQuery};
use crate::error::{RelationError, RelationResult, StoreError};
use crate::metrics;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

pub struct RelationshipStore {
    edges: Arc<dyn EdgeStore>,
    cache: Arc<dyn RelationshipCache>,
    cache_ttl: Duration,
}

impl RelationshipStore {
    pub fn new(edges: Arc<dyn EdgeStore>, cache: Arc<dyn RelationshipCache>) -> Self {
        Self {
            edges,
            cache,
            cache_ttl: ttl::FOLLOWS,
        }
    }

    pub fn with_cache_ttl(mut self, cache_ttl: Duration) -> Self {
        self.cache_ttl = cache_ttl;
        self
    }

    pub async fn health_check(&self, ctx: &RequestContext) -> RelationResult<()> {
        ctx.run(self.edges.health_check()).await??;
        Ok(())
    }

    /// Create the edge `follower_id -> following_id`.
    pub async fn follow(
        &self,
        ctx: &RequestContext,
        follower_id: Uuid,
        following_id: Uuid,
    ) -> RelationResult<Edge> {
        observed("follow", self.try_follow(ctx, follower_id, following_id)).await
    }

    async fn try_follow(
        &self,
        ctx: &RequestContext,
        follower_id: Uuid,
        following_id: Uuid,
    ) -> RelationResult<Edge> {
        let existing = ctx
            .run(self.edges.find_active(follower_id, following_id))
            .await?
            .map_err(|e| {
                error!(
                    follower = %follower_id,
                    following = %following_id,
                    error = %e,
                    "Failed to check for existing follow relationship"
                );
                e
            })?;

        if existing.is_some() {
            warn!(
                follower = %follower_id,
                following = %following_id,
                "Attempted to create a follow relationship that already exists"
            );
            return Err(RelationError::AlreadyFollowing);
        }

        let edge = Edge::new_follow(follower_id, following_id);
        match ctx.run(self.edges.insert(&edge)).await? {
            Ok(()) => {}
            Err(StoreError::UniqueViolation) => {
                // Lost the race to a concurrent follow on the same pair
                warn!(
                    follower = %follower_id,
                    following = %following_id,
                    "Concurrent follow hit the unique index"
                );
                return Err(RelationError::AlreadyFollowing);
            }
            Err(e) => {
                error!(
                    follower = %follower_id,
                    following = %following_id,
                    error = %e,
                    "Failed to create follow relationship in database"
                );
                return Err(e.into());
            }
        }

        self.cache_flag(ctx, follower_id, following_id, true).await;

        info!(
            follower = %follower_id,
            following = %following_id,
            "User followed successfully"
        );
        Ok(edge)
    }

    /// Remove the edge `follower_id -> following_id`.
    pub async fn unfollow(
        &self,
        ctx: &RequestContext,
        follower_id: Uuid,
        following_id: Uuid,
    ) -> RelationResult<()> {
        observed("unfollow", self.try_unfollow(ctx, follower_id, following_id)).await
    }

    async fn try_unfollow(
        &self,
        ctx: &RequestContext,
        follower_id: Uuid,
        following_id: Uuid,
    ) -> RelationResult<()> {
        let affected = match ctx
            .run(self.edges.delete(follower_id, following_id))
            .await?
        {
            Ok(affected) => affected,
            Err(e) => {
                error!(
                    follower = %follower_id,
                    following = %following_id,
                    error = %e,
                    "Failed to delete follow relationship from database"
                );
                return Err(e.into());
            }
        };

        if affected == 0 {
            warn!(
                follower = %follower_id,
                following = %following_id,
                "Unfollow attempt on a non-existent relationship"
            );
            return Err(RelationError::NotFollowing);
        }

        // Explicit invalidation, not a refresh: a stale `true` must not outlive the delete.
        let invalidated = match ctx
            .run(self.cache.invalidate(follower_id, following_id))
            .await
        {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                warn!(
                    follower = %follower_id,
                    following = %following_id,
                    error = %e,
                    "Failed to invalidate follows cache after unfollow"
                );
                false
            }
            Err(reason) => {
                warn!(
                    follower = %follower_id,
                    following = %following_id,
                    reason = ?reason,
                    "Follows cache invalidation interrupted after unfollow"
                );
                false
            }
        };
        metrics::record_cache_write("invalidate", invalidated);

        info!(
            follower = %follower_id,
            following = %following_id,
            "User unfollowed successfully"
        );
        Ok(())
    }

    /// Cache-aside membership check.
    pub async fn is_following(
        &self,
        ctx: &RequestContext,
        follower_id: Uuid,
        following_id: Uuid,
    ) -> RelationResult<bool> {
        observed(
            "is_following",
            self.try_is_following(ctx, follower_id, following_id),
        )
        .await
    }

    async fn try_is_following(
        &self,
        ctx: &RequestContext,
        follower_id: Uuid,
        following_id: Uuid,
    ) -> RelationResult<bool> {
        match ctx.run(self.cache.get(follower_id, following_id)).await? {
            Ok(Some(is_following)) => {
                debug!(
                    follower = %follower_id,
                    following = %following_id,
                    "Cache HIT for is_following"
                );
                metrics::record_cache_hit();
                return Ok(is_following);
            }
            Ok(None) => {
                debug!(
                    follower = %follower_id,
                    following = %following_id,
                    "Cache MISS for is_following"
                );
                metrics::record_cache_miss();
            }
            Err(e) => {
                warn!(
                    follower = %follower_id,
                    following = %following_id,
                    backend = self.cache.backend(),
                    error = %e,
                    "Cache error for is_following"
                );
                metrics::record_cache_error();
            }
        }

        let is_following = match ctx
            .run(self.edges.find_active(follower_id, following_id))
            .await?
        {
            Ok(edge) => edge.is_some(),
            Err(e) => {
                error!(
                    follower = %follower_id,
                    following = %following_id,
                    error = %e,
                    "Database error during is_following check"
                );
                return Err(e.into());
            }
        };

        self.cache_flag(ctx, follower_id, following_id, is_following)
            .await;
        Ok(is_following)
    }

    /// Followers of `user_id`, newest first. Never cached.
    pub async fn get_followers(
        &self,
        ctx: &RequestContext,
        user_id: Uuid,
        query: &ListQuery,
    ) -> RelationResult<Vec<EdgeWithUser>> {
        observed("get_followers", async {
            ctx.run(self.edges.list_followers(user_id, query))
                .await
                .map_err(RelationError::from)
                .and_then(|rows| {
                    rows.map_err(|e| {
                        error!(user = %user_id, error = %e, "Failed to list followers");
                        RelationError::from(e)
                    })
                })
        })
        .await
    }

    /// Users `user_id` follows, newest first. Never cached.
    pub async fn get_followings(
        &self,
        ctx: &RequestContext,
        user_id: Uuid,
        query: &ListQuery,
    ) -> RelationResult<Vec<EdgeWithUser>> {
        observed("get_followings", async {
            ctx.run(self.edges.list_followings(user_id, query))
                .await
                .map_err(RelationError::from)
                .and_then(|rows| {
                    rows.map_err(|e| {
                        error!(user = %user_id, error = %e, "Failed to list followings");
                        RelationError::from(e)
                    })
                })
        })
        .await
    }

    /// Best-effort write-through of a membership flag.
    async fn cache_flag(
        &self,
        ctx: &RequestContext,
        follower_id: Uuid,
        following_id: Uuid,
        is_following: bool,
    ) {
        let written = match ctx
            .run(
                self.cache
                    .set(follower_id, following_id, is_following, self.cache_ttl),
            )
            .await
        {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                warn!(
                    follower = %follower_id,
                    following = %following_id,
                    is_following = is_following,
                    backend = self.cache.backend(),
                    error = %e,
                    "Failed to cache is_following"
                );
                false
            }
            Err(reason) => {
                warn!(
                    follower = %follower_id,
                    following = %following_id,
                    reason = ?reason,
                    "Caching is_following interrupted"
                );
                false
            }
        };
        metrics::record_cache_write("set", written);
    }
}

/// Await an operation and count its outcome under `op`.
async fn observed<T, F>(op: &'static str, fut: F) -> RelationResult<T>
where
    F: Future<Output = RelationResult<T>>,
{
    let result = fut.await;
    match &result {
        Ok(_) => metrics::record_operation(op, "ok"),
        Err(e) => metrics::record_operation(op, e.kind()),
    }
    result
}
