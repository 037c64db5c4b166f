//! Bearer token authentication middleware (spec §4.O, §4.M).
//!
//! Extracts `Authorization: Bearer <token>`, verifies it via the state's
//! [`TokenVerifier`], and inserts the resulting [`Claims`] into the request
//! extensions for handlers to pick up with `Extension<Claims>`.
//!
//! Per spec §9's "role guard without auth guard" redesign flag, this layer
//! always runs before any role/ownership check -- there is no route in this
//! repository that enforces a role without first going through here.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::domain::entities::Claims;
use crate::error::AppError;
use crate::state::HasTokenVerifier;

/// Verifies the bearer token and inserts [`Claims`] into the request
/// extensions. Missing or malformed headers, and any verification failure,
/// short-circuit with the appropriate `AppError` before `next` ever runs.
pub async fn require_bearer<S>(
    State(state): State<S>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError>
where
    S: HasTokenVerifier + Clone + Send + Sync + 'static,
{
    let token = extract_bearer_token(&req)?;
    let claims = state.token_verifier().validate(token)?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

fn extract_bearer_token(req: &Request) -> Result<&str, AppError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::unauthorized("Authorization header is missing"))?;

    header
        .strip_prefix("Bearer ")
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::unauthorized("Authorization header must use the Bearer scheme"))
}

/// Rejects a request whose [`Claims`] are not one of `allowed_roles` (spec
/// §4.O: role enforcement is always layered after M, never instead of it).
pub fn require_role(claims: &Claims, allowed_roles: &[&str]) -> Result<(), AppError> {
    if allowed_roles.contains(&claims.role.as_str()) {
        Ok(())
    } else {
        Err(AppError::forbidden("You do not have permission to perform this action"))
    }
}
