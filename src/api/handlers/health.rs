//! Handler for `GET /health` (spec §6): a liveness probe only. No component
//! checks -- `O` reports the process is up; `A`/`C`/`G` failures surface as
//! `CACHE_ERROR`/`DATABASE_ERROR`/`QUEUE_ERROR` on the routes that actually
//! use them.

use axum::Json;

use crate::api::dto::health::HealthResponse;

pub async fn health_handler(service: &'static str) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "UP".to_string(),
        service: service.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
