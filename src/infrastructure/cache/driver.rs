//! Cache driver (spec §4.A): typed get/set/exists/refresh-TTL/invalidation
//! flag over a distributed KV store, with JSON marshalling.
//!
//! [`CacheDriver::get`] distinguishes a bona fide miss ([`CacheOutcome::Miss`])
//! from an infrastructure fault (`Err(AppError::cache_error(..))`) -- callers
//! on the hot path treat the former as "go to the database" and the latter
//! the same way, but the distinction matters for metrics and logging.

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use std::time::Duration;

use crate::error::AppError;

/// Result of a typed cache read: a value, a miss, or a fault bubbling up as
/// `Err`.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheOutcome<T> {
    Hit(T),
    Miss,
}

impl<T> CacheOutcome<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            CacheOutcome::Hit(v) => Some(v),
            CacheOutcome::Miss => None,
        }
    }
}

/// Typed, JSON-marshalling cache operations over every cached entity family
/// (spec §4.A). Every operation takes an ambient deadline; none retry
/// internally (spec §7: "No retry logic in the cache, store, or RPC
/// layers").
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheDriver: Send + Sync {
    /// Fetches and JSON-decodes a value, or reports a miss.
    async fn get_json(&self, key: &str) -> Result<CacheOutcome<serde_json::Value>, AppError>;

    /// JSON-encodes and stores a value with the given TTL.
    async fn set_json(
        &self,
        key: &str,
        value: serde_json::Value,
        ttl: Duration,
    ) -> Result<(), AppError>;

    async fn delete(&self, key: &str) -> Result<(), AppError>;

    async fn exists(&self, key: &str) -> Result<bool, AppError>;

    /// Refreshes a key's remaining TTL without changing its value. After a
    /// call with `ttl`, `0 < remaining <= ttl` (spec §8 invariant).
    async fn refresh_ttl(&self, key: &str, ttl: Duration) -> Result<(), AppError>;

    /// Stores the literal string `"1"` at `key` with `ttl` (spec §4.A).
    async fn set_invalidation_flag(&self, key: &str, ttl: Duration) -> Result<(), AppError>;
}

/// Ergonomic typed wrappers over [`CacheDriver`]'s JSON primitives, used by
/// every component that caches a specific Rust type (J, L, E).
#[async_trait]
pub trait CacheDriverExt: CacheDriver {
    async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<CacheOutcome<T>, AppError> {
        match self.get_json(key).await? {
            CacheOutcome::Hit(value) => {
                let decoded = serde_json::from_value(value)
                    .map_err(|e| AppError::cache_error("Malformed cache payload").wrap(e))?;
                Ok(CacheOutcome::Hit(decoded))
            }
            CacheOutcome::Miss => Ok(CacheOutcome::Miss),
        }
    }

    async fn set<T: Serialize + Sync>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> Result<(), AppError> {
        let encoded = serde_json::to_value(value)
            .map_err(|e| AppError::cache_error("Failed to encode cache payload").wrap(e))?;
        self.set_json(key, encoded, ttl).await
    }
}

impl<T: CacheDriver + ?Sized> CacheDriverExt for T {}
