//! Core domain entities representing the business data model (spec §3).
//!
//! Entities are plain data structures without business logic; the rules
//! that govern their lifecycle live in [`crate::application`].

pub mod claims;
pub mod click;
pub mod dashboard;
pub mod geo;
pub mod link;

pub use claims::Claims;
pub use click::{ClickEvent, ClickGeo, ClickMetadata, DeviceType};
pub use dashboard::{DashboardResponse, DashboardStatus, StatLink, TopLink};
pub use geo::GeoLocation;
pub use link::{Link, LinkMetadata, LinkProjection, NewLink};
