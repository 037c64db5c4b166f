//! Redirect resolver (spec §4.J): two-tier read-through cache for
//! `{shortUrl -> LinkProjection}`, with a dashboard invalidation-flag side
//! effect on both the hit and miss-then-populate paths.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::entities::LinkProjection;
use crate::domain::repositories::LinkStore;
use crate::error::AppError;
use crate::infrastructure::cache::{CacheDriver, CacheDriverExt, CacheOutcome, KeyNamer};

pub struct RedirectResolver<S: LinkStore> {
    cache: Arc<dyn CacheDriver>,
    keys: KeyNamer,
    store: Arc<S>,
    cache_ttl: Duration,
    invalidation_flag_ttl: Duration,
}

impl<S: LinkStore> RedirectResolver<S> {
    pub fn new(
        cache: Arc<dyn CacheDriver>,
        keys: KeyNamer,
        store: Arc<S>,
        cache_ttl: Duration,
        invalidation_flag_ttl: Duration,
    ) -> Self {
        Self { cache, keys, store, cache_ttl, invalidation_flag_ttl }
    }

    /// Resolves a short URL to its [`LinkProjection`] (spec §4.J).
    pub async fn get_url(&self, short_url: &str) -> Result<LinkProjection, AppError> {
        let key = self.keys.url(short_url);

        // A cache fault on the hot path degrades to a store read rather than
        // failing the request (spec §7 policy 2); only a genuine hit short-
        // circuits the store lookup below.
        match self.cache.get::<LinkProjection>(&key).await {
            Ok(CacheOutcome::Hit(projection)) => {
                self.cache.refresh_ttl(&key, self.cache_ttl).await?;
                self.mark_dashboard_invalid(projection.owner_id).await;
                return Ok(projection);
            }
            Ok(CacheOutcome::Miss) => {}
            Err(e) => {
                tracing::warn!(short_url, error = ?e, "cache read failed, falling back to store");
            }
        }

        // Store errors (URL_NOT_FOUND / URL_INACTIVE / URL_EXPIRED) propagate
        // unchanged; negative caching is deliberately not done here.
        let projection = self.store.find_by_short_code(short_url).await?;

        self.cache.set(&key, &projection, self.cache_ttl).await?;
        self.mark_dashboard_invalid(projection.owner_id).await;

        Ok(projection)
    }

    /// A thin pass-through to C, invoked by K (spec §4.J).
    pub async fn increment_click_count(&self, short_url: &str) -> Result<(), AppError> {
        self.store.increment_click_count(short_url).await
    }

    /// Sets the dashboard invalidation flag for the link's owner. This is an
    /// eventual-consistency signal, not a blocking step of the redirect
    /// (spec §4.J rationale): the redirect service doesn't know the shape of
    /// the dashboard key, so it only raises a flag for L to interpret.
    async fn mark_dashboard_invalid(&self, owner_id: i64) {
        let flag_key = self.keys.dashboard_invalid(owner_id);
        if let Err(e) = self.cache.set_invalidation_flag(&flag_key, self.invalidation_flag_ttl).await {
            tracing::warn!(owner_id, error = ?e, "Failed to set dashboard invalidation flag");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockLinkStore;
    use crate::infrastructure::cache::MockCacheDriver;

    fn sample_projection() -> LinkProjection {
        LinkProjection {
            original_url: "https://example.com/".to_string(),
            is_active: true,
            owner_id: 7,
            expires_at: None,
        }
    }

    #[tokio::test]
    async fn test_cache_hit_refreshes_ttl_and_sets_invalidation_flag() {
        let mut cache = MockCacheDriver::new();
        let projection = sample_projection();
        let json = serde_json::to_value(&projection).unwrap();

        cache
            .expect_get_json()
            .times(1)
            .returning(move |_| Ok(CacheOutcome::Hit(json.clone())));
        cache.expect_refresh_ttl().times(1).returning(|_, _| Ok(()));
        cache.expect_set_invalidation_flag().times(1).returning(|_, _| Ok(()));

        let store = MockLinkStore::new();

        let resolver = RedirectResolver::new(
            Arc::new(cache),
            KeyNamer::new("test"),
            Arc::new(store),
            Duration::from_secs(60),
            Duration::from_secs(30),
        );

        let result = resolver.get_url("abc123").await.unwrap();
        assert_eq!(result.original_url, "https://example.com/");
    }

    #[tokio::test]
    async fn test_cache_miss_falls_back_to_store_and_populates_cache() {
        let mut cache = MockCacheDriver::new();
        cache.expect_get_json().times(1).returning(|_| Ok(CacheOutcome::Miss));
        cache.expect_set_json().times(1).returning(|_, _, _| Ok(()));
        cache.expect_set_invalidation_flag().times(1).returning(|_, _| Ok(()));

        let mut store = MockLinkStore::new();
        let projection = sample_projection();
        store
            .expect_find_by_short_code()
            .times(1)
            .returning(move |_| Ok(projection.clone()));

        let resolver = RedirectResolver::new(
            Arc::new(cache),
            KeyNamer::new("test"),
            Arc::new(store),
            Duration::from_secs(60),
            Duration::from_secs(30),
        );

        let result = resolver.get_url("abc123").await.unwrap();
        assert_eq!(result.owner_id, 7);
    }

    #[tokio::test]
    async fn test_store_error_does_not_populate_cache() {
        let mut cache = MockCacheDriver::new();
        cache.expect_get_json().times(1).returning(|_| Ok(CacheOutcome::Miss));
        cache.expect_set_json().times(0);
        cache.expect_set_invalidation_flag().times(0);

        let mut store = MockLinkStore::new();
        store
            .expect_find_by_short_code()
            .times(1)
            .returning(|_| Err(AppError::url_not_found("not found")));

        let resolver = RedirectResolver::new(
            Arc::new(cache),
            KeyNamer::new("test"),
            Arc::new(store),
            Duration::from_secs(60),
            Duration::from_secs(30),
        );

        let result = resolver.get_url("missing").await;
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().kind(), crate::error::ErrorKind::UrlNotFound);
    }

    #[tokio::test]
    async fn test_cache_fault_degrades_to_store_read() {
        let mut cache = MockCacheDriver::new();
        cache.expect_get_json().times(1).returning(|_| Err(AppError::cache_error("redis down")));
        cache.expect_set_json().times(1).returning(|_, _, _| Ok(()));
        cache.expect_set_invalidation_flag().times(1).returning(|_, _| Ok(()));

        let mut store = MockLinkStore::new();
        let projection = sample_projection();
        store
            .expect_find_by_short_code()
            .times(1)
            .returning(move |_| Ok(projection.clone()));

        let resolver = RedirectResolver::new(
            Arc::new(cache),
            KeyNamer::new("test"),
            Arc::new(store),
            Duration::from_secs(60),
            Duration::from_secs(30),
        );

        let result = resolver.get_url("abc123").await.unwrap();
        assert_eq!(result.owner_id, 7);
    }

    #[tokio::test]
    async fn test_increment_click_count_delegates_to_store() {
        let cache = MockCacheDriver::new();
        let mut store = MockLinkStore::new();
        store.expect_increment_click_count().times(1).returning(|_| Ok(()));

        let resolver = RedirectResolver::new(
            Arc::new(cache),
            KeyNamer::new("test"),
            Arc::new(store),
            Duration::from_secs(60),
            Duration::from_secs(30),
        );

        assert!(resolver.increment_click_count("abc123").await.is_ok());
    }
}
