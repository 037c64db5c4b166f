//! Request/response DTOs for the HTTP boundary (spec §6).
//!
//! - [`envelope`] - generic success envelope wrapping `data`
//! - [`health`] - `GET /health`
//! - [`link`] - `POST /api/url/create` request/response
//! - [`redirect`] - `GET /r/{shortUrl}`, `GET /api/info/{shortUrl}`
//! - [`dashboard`] - `GET /api/dashboard`
//! - [`metrics`] - `GET /api/url/metrics/collisions`

pub mod dashboard;
pub mod envelope;
pub mod health;
pub mod link;
pub mod metrics;
pub mod redirect;
