//! DTO for `GET /api/url/metrics/collisions` (spec §6, §4.H, §9).

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct CollisionMetricsResponse {
    pub total_collisions: u64,
}
