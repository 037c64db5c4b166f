//! PostgreSQL repository implementations (spec §4.C, §4.D).
//!
//! Concrete implementations of the domain repository traits using SQLx for
//! type-safe SQL queries with compile-time verification.

mod pg_click_store;
mod pg_link_store;

pub use pg_click_store::PgClickStore;
pub use pg_link_store::PgLinkStore;
