/// Error types for relation-service
use crate::context::Interrupted;
use thiserror::Error;

/// Failures raised by an edge store backend.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The insert collided with the active-pair unique index.
    #[error("Unique constraint violated for follow pair")]
    UniqueViolation,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Edge store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Classify a sqlx error, pulling unique violations out of the generic bucket.
    pub fn from_sqlx(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::UniqueViolation,
            _ => StoreError::Database(err),
        }
    }
}

/// Caller-visible outcome of a relationship operation.
#[derive(Error, Debug)]
pub enum RelationError {
    #[error("Cannot follow or unfollow yourself")]
    SelfRelationNotAllowed,

    #[error("User already following")]
    AlreadyFollowing,

    #[error("Follow relationship not found")]
    NotFollowing,

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Deadline exceeded")]
    DeadlineExceeded,

    #[error("Request cancelled")]
    Cancelled,
}

impl RelationError {
    /// Expected business outcomes, as opposed to system failures.
    pub fn is_business(&self) -> bool {
        matches!(
            self,
            RelationError::SelfRelationNotAllowed
                | RelationError::AlreadyFollowing
                | RelationError::NotFollowing
        )
    }

    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            RelationError::SelfRelationNotAllowed => "self_relation",
            RelationError::AlreadyFollowing => "already_following",
            RelationError::NotFollowing => "not_following",
            RelationError::Storage(_) => "storage",
            RelationError::DeadlineExceeded => "deadline_exceeded",
            RelationError::Cancelled => "cancelled",
        }
    }
}

impl From<Interrupted> for RelationError {
    fn from(value: Interrupted) -> Self {
        match value {
            Interrupted::DeadlineExceeded => RelationError::DeadlineExceeded,
            Interrupted::Cancelled => RelationError::Cancelled,
        }
    }
}

/// Result type alias for relationship operations
pub type RelationResult<T> = Result<T, RelationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_business_errors_are_distinguishable() {
        assert!(RelationError::SelfRelationNotAllowed.is_business());
        assert!(RelationError::AlreadyFollowing.is_business());
        assert!(RelationError::NotFollowing.is_business());
        assert!(!RelationError::Storage(StoreError::Unavailable("down".into())).is_business());
        assert!(!RelationError::DeadlineExceeded.is_business());
    }

    #[test]
    fn test_interrupted_conversion() {
        assert!(matches!(
            RelationError::from(Interrupted::DeadlineExceeded),
            RelationError::DeadlineExceeded
        ));
        assert!(matches!(
            RelationError::from(Interrupted::Cancelled),
            RelationError::Cancelled
        ));
    }

    #[test]
    fn test_non_database_sqlx_error_stays_generic() {
        let err = StoreError::from_sqlx(sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::Database(sqlx::Error::RowNotFound)));
    }
}
