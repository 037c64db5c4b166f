//! No-op cache driver, used when Redis is unavailable or disabled.
//!
//! Every read reports a miss and every write succeeds without storing
//! anything; callers fall through to the store on every access.

use async_trait::async_trait;
use std::time::Duration;

use super::driver::{CacheDriver, CacheOutcome};
use crate::error::AppError;

#[derive(Default)]
pub struct NullCacheDriver;

impl NullCacheDriver {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CacheDriver for NullCacheDriver {
    async fn get_json(&self, _key: &str) -> Result<CacheOutcome<serde_json::Value>, AppError> {
        Ok(CacheOutcome::Miss)
    }

    async fn set_json(
        &self,
        _key: &str,
        _value: serde_json::Value,
        _ttl: Duration,
    ) -> Result<(), AppError> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> Result<(), AppError> {
        Ok(())
    }

    async fn exists(&self, _key: &str) -> Result<bool, AppError> {
        Ok(false)
    }

    async fn refresh_ttl(&self, _key: &str, _ttl: Duration) -> Result<(), AppError> {
        Ok(())
    }

    async fn set_invalidation_flag(&self, _key: &str, _ttl: Duration) -> Result<(), AppError> {
        Ok(())
    }
}
