//! Router composition for the two binaries (spec §6, §9 "table-driven
//! route registration").
//!
//! Each binary builds its own router over its own state shape
//! ([`AuthoringState`] / [`RedirectState`]); the table-driven
//! `{method, path, handler, middlewares}` registration from the source
//! maps directly onto axum's `Router::route`/`route_layer` composition.

use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;

use crate::api::handlers::{
    collisions_handler, create_handler, dashboard_handler, health_handler, info_handler,
    redirect_handler,
};
use crate::api::middleware::{auth, rate_limit, tracing};
use crate::state::{AuthoringState, RedirectState};

/// Builds the authoring service's router (spec §6 authoring table):
///
/// - `GET  /health`                       - liveness, no auth
/// - `POST /api/url/create`               - Bearer `user`/`admin`
/// - `GET  /api/url/metrics/collisions`   - Bearer `admin`
pub fn authoring_router(state: AuthoringState) -> Router {
    let protected = Router::new()
        .route("/api/url/create", post(create_handler))
        .route("/api/url/metrics/collisions", get(collisions_handler))
        .route_layer(from_fn_with_state(state.clone(), auth::require_bearer::<AuthoringState>))
        .layer(rate_limit::secure_layer());

    let public = Router::new()
        .route("/health", get(|| health_handler("authoring-service")))
        .layer(rate_limit::layer());

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(tracing::layer())
        .with_state(state)
}

/// Builds the redirect service's router (spec §6 redirect table):
///
/// - `GET /health`               - liveness, no auth
/// - `GET /r/{shortUrl}`         - redirect resolution + click tracking
/// - `GET /api/info/{shortUrl}`  - same resolution, no click tracking
/// - `GET /api/dashboard`        - Bearer, cache-fronted analytics
pub fn redirect_router(state: RedirectState) -> Router {
    let protected = Router::new()
        .route("/api/dashboard", get(dashboard_handler))
        .route_layer(from_fn_with_state(state.clone(), auth::require_bearer::<RedirectState>))
        .layer(rate_limit::secure_layer());

    let public = Router::new()
        .route("/health", get(|| health_handler("redirect-service")))
        .route("/r/{shortUrl}", get(redirect_handler))
        .route("/api/info/{shortUrl}", get(info_handler))
        .layer(rate_limit::layer());

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(tracing::layer())
        .with_state(state)
}
