//! Link store trait (spec §4.C).
//!
//! `find_by_short_code` is the one place the §4.C post-filter lives: the
//! implementation queries on `(shortCode, isDeleted = false)`, projects only
//! the four hot-path fields, and then applies the inactive/expired checks
//! itself, so callers never see a dead link succeed.

use async_trait::async_trait;

use crate::domain::entities::{Link, LinkProjection, NewLink};
use crate::error::AppError;

/// Outcome of an insert attempt that may race on a unique constraint.
///
/// Kept separate from [`AppError`] because spec §4.N's closed error-kind set
/// has no single "duplicate key" kind — whether a duplicate means
/// `CUSTOM_ALIAS_TAKEN` (a user picked a name someone already has) or is
/// just evidence of keyspace pressure to retry (the allocator, H) is a
/// decision only the caller can make.
#[derive(Debug)]
pub enum InsertOutcome {
    Inserted(Link),
    DuplicateKey,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkStore: Send + Sync {
    /// Looks up a link by its short code, applying the active/expiry
    /// post-filter described in spec §4.C. Never returns a dead link as a
    /// success — callers get `URL_NOT_FOUND` / `URL_INACTIVE` / `URL_EXPIRED`
    /// instead.
    async fn find_by_short_code(&self, code: &str) -> Result<LinkProjection, AppError>;

    /// Atomically increments `clickCount` and bumps `updatedAt`. Zero rows
    /// matched maps to `URL_NOT_FOUND`.
    async fn increment_click_count(&self, code: &str) -> Result<(), AppError>;

    /// Uniqueness probe used by the custom-alias path before reservation;
    /// the allocator's own generated codes rely on `insert`'s duplicate-key
    /// surfacing instead of pre-checking existence.
    async fn exists(&self, code: &str) -> Result<bool, AppError>;

    /// Inserts a new link, surfacing a duplicate short-code as
    /// [`InsertOutcome::DuplicateKey`] rather than a generic database error.
    async fn insert(&self, new_link: NewLink) -> Result<InsertOutcome, AppError>;
}
