use crate::domain::edge::{Edge, EdgeWithUser};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Standard error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Body for follow and unfollow
#[derive(Debug, Serialize, Deserialize)]
pub struct RelationRequest {
    pub follower_id: Uuid,
    pub following_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FollowResponse {
    pub message: String,
    pub relation: Edge,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IsFollowingResponse {
    pub is_following: bool,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FollowersResponse {
    pub followers: Vec<EdgeWithUser>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FollowingsResponse {
    pub followings: Vec<EdgeWithUser>,
}
