use crate::domain::edge::{Edge, EdgeWithUser, ListQuery};
use crate::error::StoreError;
use uuid::Uuid;

/// Durable follow-edge storage, the source of truth for the relationship store.
///
/// Implementations must enforce at most one active edge per ordered pair at
/// the storage level and report a collision from `insert` as
/// [`StoreError::UniqueViolation`].
#[async_trait::async_trait]
pub trait EdgeStore: Send + Sync {
    /// Active edge for the exact ordered pair, if any
    async fn find_active(
        &self,
        follower_id: Uuid,
        following_id: Uuid,
    ) -> Result<Option<Edge>, StoreError>;

    /// Persist a new edge
    async fn insert(&self, edge: &Edge) -> Result<(), StoreError>;

    /// Remove the active edge for the pair; returns rows affected
    async fn delete(&self, follower_id: Uuid, following_id: Uuid) -> Result<u64, StoreError>;

    /// Edges pointing at `user_id`, newest first, joined with the follower's identity
    async fn list_followers(
        &self,
        user_id: Uuid,
        query: &ListQuery,
    ) -> Result<Vec<EdgeWithUser>, StoreError>;

    /// Edges leaving `user_id`, newest first, joined with the followed user's identity
    async fn list_followings(
        &self,
        user_id: Uuid,
        query: &ListQuery,
    ) -> Result<Vec<EdgeWithUser>, StoreError>;

    /// Health check (optional)
    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
