use crate::context::RequestContext;
use crate::domain::edge::{Edge, EdgeWithUser, ListQuery};
use crate::error::{RelationError, RelationResult};
use crate::metrics;
use crate::repository::RelationshipStore;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Domain policy in front of the relationship store.
///
/// Rules here hold regardless of storage behaviour and are checked before any
/// store or cache access.
#[derive(Clone)]
pub struct RelationService {
    store: Arc<RelationshipStore>,
}

impl RelationService {
    pub fn new(store: Arc<RelationshipStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<RelationshipStore> {
        &self.store
    }

    pub async fn follow(
        &self,
        ctx: &RequestContext,
        follower_id: Uuid,
        following_id: Uuid,
    ) -> RelationResult<Edge> {
        reject_self_relation("follow", follower_id, following_id)?;
        self.store.follow(ctx, follower_id, following_id).await
    }

    pub async fn unfollow(
        &self,
        ctx: &RequestContext,
        follower_id: Uuid,
        following_id: Uuid,
    ) -> RelationResult<()> {
        reject_self_relation("unfollow", follower_id, following_id)?;
        self.store.unfollow(ctx, follower_id, following_id).await
    }

    pub async fn is_following(
        &self,
        ctx: &RequestContext,
        follower_id: Uuid,
        following_id: Uuid,
    ) -> RelationResult<bool> {
        self.store.is_following(ctx, follower_id, following_id).await
    }

    pub async fn get_followers(
        &self,
        ctx: &RequestContext,
        user_id: Uuid,
        query: &ListQuery,
    ) -> RelationResult<Vec<EdgeWithUser>> {
        self.store.get_followers(ctx, user_id, query).await
    }

    pub async fn get_followings(
        &self,
        ctx: &RequestContext,
        user_id: Uuid,
        query: &ListQuery,
    ) -> RelationResult<Vec<EdgeWithUser>> {
        self.store.get_followings(ctx, user_id, query).await
    }
}

fn reject_self_relation(op: &str, follower_id: Uuid, following_id: Uuid) -> RelationResult<()> {
    if follower_id == following_id {
        debug!(user = %follower_id, op = op, "Rejected self relation");
        metrics::record_operation(op, "self_relation");
        return Err(RelationError::SelfRelationNotAllowed);
    }
    Ok(())
}
