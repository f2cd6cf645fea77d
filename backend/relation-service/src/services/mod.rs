pub mod relation;

pub use relation::RelationService;
