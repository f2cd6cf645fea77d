pub mod cache;
pub mod config;
pub mod context;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod repository;
pub mod rest_api;
pub mod services;

pub use context::{CancelHandle, RequestContext};
pub use domain::edge::{Edge, EdgeWithUser, ListQuery};
pub use error::{RelationError, RelationResult, StoreError};
pub use repository::{EdgeStore, PostgresEdgeStore, RelationshipStore};
pub use services::RelationService;
