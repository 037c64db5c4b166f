//! Repository trait definitions for the domain layer (spec §4.C, §4.D).
//!
//! Traits define the contract for data access; implementations live in
//! [`crate::infrastructure::persistence`]. Mock implementations are
//! auto-generated via `mockall` for testing.

pub mod click_store;
pub mod link_store;

pub use click_store::ClickStore;
pub use link_store::{InsertOutcome, LinkStore};

#[cfg(test)]
pub use click_store::MockClickStore;
#[cfg(test)]
pub use link_store::MockLinkStore;
