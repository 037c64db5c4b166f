//! Handlers for `POST /api/url/create` and `GET /api/url/metrics/collisions`
//! (spec §6, §4.H, §4.I).

use axum::Extension;
use axum::extract::State;
use axum::http::StatusCode;
use axum::{Json, response::IntoResponse};
use validator::Validate;

use crate::api::dto::envelope::ApiResponse;
use crate::api::dto::link::{CreateLinkRequest, LinkResponse};
use crate::api::dto::metrics::CollisionMetricsResponse;
use crate::api::middleware::auth::require_role;
use crate::application::link_authoring::CreateLinkInput;
use crate::domain::entities::Claims;
use crate::error::AppError;
use crate::state::AuthoringState;

/// `POST /api/url/create` (spec §6): Bearer `user`/`admin`.
pub async fn create_handler(
    State(state): State<AuthoringState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<CreateLinkRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_role(&claims, &["user", "admin"])?;
    request.validate()?;

    let input = CreateLinkInput {
        original_url: request.original_url,
        custom_alias: request.custom_alias,
        title: request.title,
        description: request.description,
    };

    let link = state.link_authoring.create(input, claims.user_id).await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message("Link created", LinkResponse::from(link)),
    ))
}

/// `GET /api/url/metrics/collisions` (spec §6, §9): Bearer `admin` only,
/// reporting H's process-local collision counter.
pub async fn collisions_handler(
    State(state): State<AuthoringState>,
    Extension(claims): Extension<Claims>,
) -> Result<ApiResponse<CollisionMetricsResponse>, AppError> {
    require_role(&claims, &["admin"])?;

    Ok(ApiResponse::ok(CollisionMetricsResponse {
        total_collisions: state.allocator.collision_count(),
    }))
}
