//! Handler for `GET /api/dashboard` (spec §6, §4.L).

use axum::Extension;
use axum::extract::State;

use crate::api::dto::dashboard::DashboardDto;
use crate::api::dto::envelope::ApiResponse;
use crate::domain::entities::Claims;
use crate::error::AppError;
use crate::state::RedirectState;

/// Requires a Bearer token (layered via [`crate::api::middleware::auth`]);
/// the dashboard scope is always the caller's own `ownerId` from their
/// verified claims, never a path parameter.
pub async fn dashboard_handler(
    State(state): State<RedirectState>,
    Extension(claims): Extension<Claims>,
) -> Result<ApiResponse<DashboardDto>, AppError> {
    let dashboard = state.dashboard_service.get_dashboard(claims.user_id).await?;
    Ok(ApiResponse::ok(DashboardDto::from(dashboard)))
}
