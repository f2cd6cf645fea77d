mod postgres_repository;
mod relationship_store;
mod r#trait;

pub use postgres_repository::PostgresEdgeStore;
pub use r#trait::EdgeStore;
pub use relationship_store::RelationshipStore;
