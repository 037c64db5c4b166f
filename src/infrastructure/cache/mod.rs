//! Caching layer (spec §4.A cache driver, §4.B key namer).
//!
//! [`CacheDriver`] is the typed get/set/exists/refresh-TTL/invalidation-flag
//! contract; [`RedisCacheDriver`] and [`NullCacheDriver`] are its two
//! implementations. [`KeyNamer`] derives every cache key deterministically.

mod driver;
mod keys;
mod null_cache;
mod redis_cache;

pub use driver::{CacheDriver, CacheDriverExt, CacheOutcome};
pub use keys::KeyNamer;
pub use null_cache::NullCacheDriver;
pub use redis_cache::RedisCacheDriver;

#[cfg(test)]
pub use driver::MockCacheDriver;
