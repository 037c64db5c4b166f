//! HTTP request handlers for API endpoints (spec §6).
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod dashboard;
pub mod health;
pub mod redirect;
pub mod url;

pub use dashboard::dashboard_handler;
pub use health::health_handler;
pub use redirect::{info_handler, redirect_handler};
pub use url::{collisions_handler, create_handler};
