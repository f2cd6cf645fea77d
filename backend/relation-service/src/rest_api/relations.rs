//! Relation API endpoints
//!
//! POST   /api/v1/relations/followings - Follow a user
//! DELETE /api/v1/relations/followings - Unfollow a user
//! GET    /api/v1/relations/{user_id}/followings/{target_user_id} - Check if following
//! GET    /api/v1/relations/{user_id}/followers - Followers of a user
//! GET    /api/v1/relations/{user_id}/followings - Users a user follows

use actix_web::{web, HttpResponse};
use tracing::info;
use uuid::Uuid;

use super::models::{
    ErrorResponse, FollowResponse, FollowersResponse, FollowingsResponse, IsFollowingResponse,
    ListParams, MessageResponse, RelationRequest,
};
use super::RelationApiState;
use crate::domain::edge::{ListQuery, DEFAULT_PAGE_SIZE};
use crate::error::RelationError;

fn parse_user_id(raw: &str, field: &str) -> Result<Uuid, HttpResponse> {
    Uuid::parse_str(raw).map_err(|e| {
        HttpResponse::BadRequest().json(ErrorResponse::new(format!("Invalid {}: {}", field, e)))
    })
}

fn parse_list_query(params: &ListParams) -> Result<ListQuery, HttpResponse> {
    let page = params.page.unwrap_or(1);
    let limit = params.limit.unwrap_or(DEFAULT_PAGE_SIZE);
    if page < 1 {
        return Err(HttpResponse::BadRequest().json(ErrorResponse::new("Invalid page parameter")));
    }
    ListQuery::from_page(page, limit, params.name.clone().unwrap_or_default()).ok_or_else(|| {
        HttpResponse::BadRequest().json(ErrorResponse::new("Invalid limit parameter"))
    })
}

/// POST /api/v1/relations/followings
pub async fn follow(
    state: web::Data<RelationApiState>,
    body: web::Json<RelationRequest>,
) -> Result<HttpResponse, RelationError> {
    let req = body.into_inner();
    let ctx = state.request_context();

    let edge = state
        .service
        .follow(&ctx, req.follower_id, req.following_id)
        .await?;

    info!(follower = %req.follower_id, following = %req.following_id, "POST /followings");
    Ok(HttpResponse::Created().json(FollowResponse {
        message: "follow success".to_string(),
        relation: edge,
    }))
}

/// DELETE /api/v1/relations/followings
pub async fn unfollow(
    state: web::Data<RelationApiState>,
    body: web::Json<RelationRequest>,
) -> Result<HttpResponse, RelationError> {
    let req = body.into_inner();
    let ctx = state.request_context();

    state
        .service
        .unfollow(&ctx, req.follower_id, req.following_id)
        .await?;

    info!(follower = %req.follower_id, following = %req.following_id, "DELETE /followings");
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "unfollow success".to_string(),
    }))
}

/// GET /api/v1/relations/{user_id}/followings/{target_user_id}
pub async fn is_following(
    state: web::Data<RelationApiState>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, RelationError> {
    let (user_id, target_user_id) = path.into_inner();
    let follower_id = match parse_user_id(&user_id, "user_id") {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };
    let following_id = match parse_user_id(&target_user_id, "target_user_id") {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };

    let ctx = state.request_context();
    let is_following = state
        .service
        .is_following(&ctx, follower_id, following_id)
        .await?;

    Ok(HttpResponse::Ok().json(IsFollowingResponse { is_following }))
}

/// GET /api/v1/relations/{user_id}/followers
pub async fn get_followers(
    state: web::Data<RelationApiState>,
    path: web::Path<String>,
    params: web::Query<ListParams>,
) -> Result<HttpResponse, RelationError> {
    let user_id = match parse_user_id(&path.into_inner(), "user_id") {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };
    let query = match parse_list_query(&params) {
        Ok(query) => query,
        Err(resp) => return Ok(resp),
    };

    let ctx = state.request_context();
    let followers = state.service.get_followers(&ctx, user_id, &query).await?;

    Ok(HttpResponse::Ok().json(FollowersResponse { followers }))
}

/// GET /api/v1/relations/{user_id}/followings
pub async fn get_followings(
    state: web::Data<RelationApiState>,
    path: web::Path<String>,
    params: web::Query<ListParams>,
) -> Result<HttpResponse, RelationError> {
    let user_id = match parse_user_id(&path.into_inner(), "user_id") {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };
    let query = match parse_list_query(&params) {
        Ok(query) => query,
        Err(resp) => return Ok(resp),
    };

    let ctx = state.request_context();
    let followings = state.service.get_followings(&ctx, user_id, &query).await?;

    Ok(HttpResponse::Ok().json(FollowingsResponse { followings }))
}
