//! Relationship cache key schema
//!
//! Key format: v{VERSION}:relation:{kind}:{identifiers}

use uuid::Uuid;

/// Cache schema version - increment when changing key formats
pub const CACHE_VERSION: u32 = 1;

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Membership flag for an ordered pair
    /// Format: v1:relation:follows:{follower_id}:{following_id}
    pub fn follows(follower_id: Uuid, following_id: Uuid) -> String {
        format!(
            "v{}:relation:follows:{}:{}",
            CACHE_VERSION, follower_id, following_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_follows_key() {
        let follower = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        let following = Uuid::parse_str("660e8400-e29b-41d4-a716-446655440001").unwrap();
        assert_eq!(
            CacheKey::follows(follower, following),
            "v1:relation:follows:550e8400-e29b-41d4-a716-446655440000:660e8400-e29b-41d4-a716-446655440001"
        );
    }

    #[test]
    fn test_follows_key_is_ordered() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_ne!(CacheKey::follows(a, b), CacheKey::follows(b, a));
    }
}
