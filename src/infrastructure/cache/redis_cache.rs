//! Redis-backed implementation of the cache driver (spec §4.A).

use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use std::time::Duration;

use super::driver::{CacheDriver, CacheOutcome};
use crate::error::AppError;

pub struct RedisCacheDriver {
    conn: ConnectionManager,
}

impl RedisCacheDriver {
    /// Connects to Redis and validates the connection with a PING.
    pub async fn connect(redis_url: &str) -> Result<Self, AppError> {
        let client = Client::open(redis_url)
            .map_err(|e| AppError::cache_error("Invalid Redis URL").wrap(e))?;

        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| AppError::cache_error("Failed to connect to Redis").wrap(e))?;

        let mut ping_conn = conn.clone();
        let _: () = ping_conn
            .ping()
            .await
            .map_err(|e| AppError::cache_error("Redis PING failed").wrap(e))?;

        Ok(Self { conn })
    }
}

#[async_trait]
impl CacheDriver for RedisCacheDriver {
    async fn get_json(&self, key: &str) -> Result<CacheOutcome<serde_json::Value>, AppError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn
            .get(key)
            .await
            .map_err(|e| AppError::cache_error("Redis GET failed").wrap(e).with_context("key", key))?;

        match raw {
            None => Ok(CacheOutcome::Miss),
            Some(raw) => {
                let value = serde_json::from_str(&raw)
                    .map_err(|e| AppError::cache_error("Malformed cache payload").wrap(e))?;
                Ok(CacheOutcome::Hit(value))
            }
        }
    }

    async fn set_json(
        &self,
        key: &str,
        value: serde_json::Value,
        ttl: Duration,
    ) -> Result<(), AppError> {
        let mut conn = self.conn.clone();
        let encoded = value.to_string();
        let ttl_secs = ttl.as_secs().max(1);
        let _: () = conn
            .set_ex(key, encoded, ttl_secs)
            .await
            .map_err(|e| AppError::cache_error("Redis SET failed").wrap(e).with_context("key", key))?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        let mut conn = self.conn.clone();
        let _: i64 = conn
            .del(key)
            .await
            .map_err(|e| AppError::cache_error("Redis DEL failed").wrap(e).with_context("key", key))?;
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, AppError> {
        let mut conn = self.conn.clone();
        let exists: bool = conn
            .exists(key)
            .await
            .map_err(|e| AppError::cache_error("Redis EXISTS failed").wrap(e).with_context("key", key))?;
        Ok(exists)
    }

    async fn refresh_ttl(&self, key: &str, ttl: Duration) -> Result<(), AppError> {
        let mut conn = self.conn.clone();
        let ttl_secs = ttl.as_secs().max(1) as i64;
        let _: bool = conn
            .expire(key, ttl_secs)
            .await
            .map_err(|e| AppError::cache_error("Redis EXPIRE failed").wrap(e).with_context("key", key))?;
        Ok(())
    }

    async fn set_invalidation_flag(&self, key: &str, ttl: Duration) -> Result<(), AppError> {
        self.set_json(key, serde_json::Value::String("1".to_string()), ttl)
            .await
    }
}
