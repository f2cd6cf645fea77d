use super::EdgeStore;
use crate::domain::edge::{Edge, EdgeWithUser, ListQuery};
use crate::error::StoreError;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

/// PostgreSQL edge store (source of truth)
#[derive(Clone)]
pub struct PostgresEdgeStore {
    pool: PgPool,
}

impl PostgresEdgeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl EdgeStore for PostgresEdgeStore {
    async fn find_active(
        &self,
        follower_id: Uuid,
        following_id: Uuid,
    ) -> Result<Option<Edge>, StoreError> {
        sqlx::query_as::<_, Edge>(
            r#"
            SELECT id, follower_id, following_id, created_at, updated_at, deleted_at
            FROM follows
            WHERE follower_id = $1 AND following_id = $2 AND deleted_at IS NULL
            LIMIT 1
            "#,
        )
        .bind(follower_id)
        .bind(following_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)
    }

    async fn insert(&self, edge: &Edge) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO follows (id, follower_id, following_id, created_at, updated_at, deleted_at)
            VALUES ($1, $2, $3, $4, $5, NULL)
            "#,
        )
        .bind(edge.id)
        .bind(edge.follower_id)
        .bind(edge.following_id)
        .bind(edge.created_at)
        .bind(edge.updated_at)
        .execute(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?;

        debug!(
            "Created follow in PostgreSQL: {} -> {}",
            edge.follower_id, edge.following_id
        );
        Ok(())
    }

    async fn delete(&self, follower_id: Uuid, following_id: Uuid) -> Result<u64, StoreError> {
        let affected = sqlx::query(
            r#"
            DELETE FROM follows
            WHERE follower_id = $1 AND following_id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(follower_id)
        .bind(following_id)
        .execute(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?
        .rows_affected();

        debug!(
            "Deleted follow in PostgreSQL: {} -> {} ({} rows)",
            follower_id, following_id, affected
        );
        Ok(affected)
    }

    async fn list_followers(
        &self,
        user_id: Uuid,
        query: &ListQuery,
    ) -> Result<Vec<EdgeWithUser>, StoreError> {
        let rows = sqlx::query_as::<_, EdgeWithUser>(
            r#"
            SELECT f.id, f.follower_id, f.following_id, u.name, u.username, f.created_at
            FROM follows f
            JOIN users u ON u.id = f.follower_id
            WHERE f.following_id = $1
              AND f.deleted_at IS NULL
              AND ($2::text IS NULL OR u.name ILIKE $2)
            ORDER BY f.created_at DESC, f.id DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(user_id)
        .bind(query.like_pattern())
        .bind(query.limit)
        .bind(query.offset)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?;

        debug!(
            "Got {} followers for user {} from PostgreSQL (offset: {})",
            rows.len(),
            user_id,
            query.offset
        );
        Ok(rows)
    }

    async fn list_followings(
        &self,
        user_id: Uuid,
        query: &ListQuery,
    ) -> Result<Vec<EdgeWithUser>, StoreError> {
        let rows = sqlx::query_as::<_, EdgeWithUser>(
            r#"
            SELECT f.id, f.follower_id, f.following_id, u.name, u.username, f.created_at
            FROM follows f
            JOIN users u ON u.id = f.following_id
            WHERE f.follower_id = $1
              AND f.deleted_at IS NULL
              AND ($2::text IS NULL OR u.name ILIKE $2)
            ORDER BY f.created_at DESC, f.id DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(user_id)
        .bind(query.like_pattern())
        .bind(query.limit)
        .bind(query.offset)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?;

        debug!(
            "Got {} followings for user {} from PostgreSQL (offset: {})",
            rows.len(),
            user_id,
            query.offset
        );
        Ok(rows)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)?;
        Ok(())
    }
}
