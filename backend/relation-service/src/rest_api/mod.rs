//! HTTP adapter over the relation service

pub mod models;
pub mod relations;

use actix_web::error::{InternalError, JsonPayloadError, QueryPayloadError};
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse, ResponseError};
use prometheus::Registry;
use std::time::Duration;
use tracing::error;

use crate::context::RequestContext;
use crate::error::RelationError;
use crate::metrics;
use crate::services::RelationService;
use models::ErrorResponse;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct RelationApiState {
    pub service: RelationService,
    pub request_timeout: Duration,
}

impl RelationApiState {
    pub fn new(service: RelationService, request_timeout: Duration) -> Self {
        Self {
            service,
            request_timeout,
        }
    }

    /// Fresh deadline for one request
    pub fn request_context(&self) -> RequestContext {
        RequestContext::with_timeout(self.request_timeout)
    }
}

impl ResponseError for RelationError {
    fn status_code(&self) -> StatusCode {
        match self {
            RelationError::SelfRelationNotAllowed => StatusCode::BAD_REQUEST,
            RelationError::NotFollowing => StatusCode::NOT_FOUND,
            RelationError::AlreadyFollowing => StatusCode::CONFLICT,
            RelationError::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
            RelationError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
            RelationError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            RelationError::Storage(e) => {
                error!(error = %e, "Relation request failed on storage");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(ErrorResponse::new(message))
    }
}

/// Malformed JSON bodies answer with the standard error body.
fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let response = HttpResponse::BadRequest()
        .json(ErrorResponse::new(format!("Invalid request body: {}", err)));
    InternalError::from_response(err, response).into()
}

fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let response = HttpResponse::BadRequest()
        .json(ErrorResponse::new(format!("Invalid query parameters: {}", err)));
    InternalError::from_response(err, response).into()
}

/// Register the relation routes under `/api/v1/relations`
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/relations")
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .app_data(web::QueryConfig::default().error_handler(query_error_handler))
            .route("/followings", web::post().to(relations::follow))
            .route("/followings", web::delete().to(relations::unfollow))
            .route(
                "/{user_id}/followings/{target_user_id}",
                web::get().to(relations::is_following),
            )
            .route("/{user_id}/followers", web::get().to(relations::get_followers))
            .route(
                "/{user_id}/followings",
                web::get().to(relations::get_followings),
            ),
    );
}

/// Register `/health`, `/ready` and `/metrics`
pub fn configure_probes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(|| async { "OK" }))
        .route("/ready", web::get().to(ready))
        .route("/metrics", web::get().to(metrics_endpoint));
}

async fn ready(state: web::Data<RelationApiState>) -> HttpResponse {
    let ctx = state.request_context();
    match state.service.store().health_check(&ctx).await {
        Ok(()) => HttpResponse::Ok().body("READY"),
        Err(e) => {
            error!(error = %e, "Readiness check failed");
            HttpResponse::ServiceUnavailable().json(ErrorResponse::new("edge store unavailable"))
        }
    }
}

async fn metrics_endpoint(registry: web::Data<Registry>) -> HttpResponse {
    match metrics::render(&registry) {
        Ok(body) => HttpResponse::Ok()
            .content_type("text/plain; version=0.0.4")
            .body(body),
        Err(e) => HttpResponse::InternalServerError().body(format!("error: {}", e)),
    }
}
