use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default page size for follower/following listings
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Upper bound on a single listing page
pub const MAX_PAGE_SIZE: i64 = 100;

/// Directed follow edge (follower -> following), the durable source of truth
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Edge {
    pub id: Uuid,
    pub follower_id: Uuid,
    pub following_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Soft-delete marker; rows with a value here are logically absent.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Edge {
    pub fn new_follow(follower_id: Uuid, following_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            follower_id,
            following_id,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}

/// Edge joined with the counterpart user's identity record.
///
/// For follower listings `name`/`username` describe the follower; for
/// following listings they describe the followed user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct EdgeWithUser {
    pub id: Uuid,
    pub follower_id: Uuid,
    pub following_id: Uuid,
    pub name: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// Pagination and filter parameters for listings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub limit: i64,
    pub offset: i64,
    /// Case-insensitive display-name substring; `None` means unfiltered.
    pub name_filter: Option<String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
            name_filter: None,
        }
    }
}

impl ListQuery {
    /// Normalizes the inputs: limit clamped to `1..=MAX_PAGE_SIZE`, negative
    /// offsets raised to zero, all-blank filters dropped. A non-blank filter is
    /// kept verbatim, surrounding whitespace included.
    pub fn new(limit: i64, offset: i64, name_filter: impl Into<String>) -> Self {
        let filter = name_filter.into();
        Self {
            limit: limit.clamp(1, MAX_PAGE_SIZE),
            offset: offset.max(0),
            name_filter: (!filter.trim().is_empty()).then_some(filter),
        }
    }

    /// Build from 1-based page numbering. Returns `None` for page or limit below 1.
    pub fn from_page(page: i64, limit: i64, name_filter: impl Into<String>) -> Option<Self> {
        if page < 1 || limit < 1 {
            return None;
        }
        let limit = limit.min(MAX_PAGE_SIZE);
        let offset = (page - 1).saturating_mul(limit);
        Some(Self::new(limit, offset, name_filter))
    }

    /// `ILIKE` pattern for the name filter with wildcards in the input escaped.
    pub fn like_pattern(&self) -> Option<String> {
        self.name_filter
            .as_deref()
            .map(|filter| format!("%{}%", escape_like(filter)))
    }

    /// In-process equivalent of the `ILIKE` filter.
    pub fn matches_name(&self, name: &str) -> bool {
        match &self.name_filter {
            Some(filter) => name.to_lowercase().contains(&filter.to_lowercase()),
            None => true,
        }
    }
}

fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
