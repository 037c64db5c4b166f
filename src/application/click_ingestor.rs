//! Click ingestor (spec §4.K): builds a [`ClickEvent`] from request metadata
//! and fans out to the click store (D), geo-IP resolver (E), and UA parser
//! (F), without ever blocking the redirect response that triggered it.
//!
//! The request boundary (O) spawns [`ClickIngestor::track_click`] on an
//! independent task with its own deadline (spec §4.K, §5) so that a client
//! disconnecting after the redirect response never cancels analytics.

use std::sync::Arc;
use std::time::Duration;

use sha2::{Digest, Sha256};

use crate::application::redirect_resolver::RedirectResolver;
use crate::domain::entities::{ClickEvent, ClickGeo, ClickMetadata, GeoLocation};
use crate::domain::repositories::{ClickStore, LinkStore};
use crate::infrastructure::geoip::GeoIpResolver;
use crate::utils::ua_parser::{extract_domain, parse_ua};

pub struct ClickIngestor<L: LinkStore, C: ClickStore> {
    resolver: Arc<RedirectResolver<L>>,
    click_store: Arc<C>,
    geoip: Arc<GeoIpResolver>,
    timeout: Duration,
}

impl<L: LinkStore, C: ClickStore> ClickIngestor<L, C> {
    pub fn new(
        resolver: Arc<RedirectResolver<L>>,
        click_store: Arc<C>,
        geoip: Arc<GeoIpResolver>,
        timeout: Duration,
    ) -> Self {
        Self { resolver, click_store, geoip, timeout }
    }

    /// Runs the full spec §4.K pipeline under a single logical deadline.
    /// Never returns an error: every step is best-effort and failures are
    /// logged, never propagated (spec §4.D, §7).
    pub async fn track_click(&self, metadata: ClickMetadata) {
        if tokio::time::timeout(self.timeout, self.run(metadata)).await.is_err() {
            tracing::warn!("click ingestion exceeded its deadline");
        }
    }

    async fn run(&self, metadata: ClickMetadata) {
        let increment = async {
            if let Err(e) = self.resolver.increment_click_count(&metadata.short_code).await {
                tracing::warn!(
                    short_code = %metadata.short_code,
                    error = ?e,
                    "click count increment failed"
                );
            }
        };

        let geo_lookup = async {
            match &metadata.client_ip {
                Some(ip) => match self.geoip.get_location(ip).await {
                    Ok(location) => Some(to_click_geo(location)),
                    Err(e) => {
                        tracing::debug!(ip = %ip, error = ?e, "geo-IP lookup failed, continuing without it");
                        None
                    }
                },
                None => None,
            }
        };

        let (_, geo) = tokio::join!(increment, geo_lookup);

        let ua = match metadata.user_agent.as_deref() {
            Some(raw) => parse_ua(raw),
            None => parse_ua(""),
        };
        let referrer_domain = metadata.referrer.as_deref().map(extract_domain);

        let event = ClickEvent {
            clicked_at: chrono::Utc::now(),
            short_code: metadata.short_code.clone(),
            ip_address_hash: hash_ip(metadata.client_ip.as_deref().unwrap_or("")),
            user_agent: metadata.user_agent,
            referrer_url: metadata.referrer,
            referrer_domain,
            device_type: ua.device_type,
            browser_name: ua.browser_name,
            browser_version: ua.browser_version,
            os_name: ua.os_name,
            os_version: ua.os_version,
            is_bot: ua.is_bot,
            geo,
        };

        if let Err(e) = self.click_store.insert(event).await {
            tracing::warn!(
                short_code = %metadata.short_code,
                error = ?e,
                "click event insert failed, dropping"
            );
        }
    }
}

/// SHA-256 of the raw client IP, lower-case hex (spec §3, §8 invariant).
fn hash_ip(ip: &str) -> String {
    let digest = Sha256::digest(ip.as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

fn to_click_geo(location: GeoLocation) -> ClickGeo {
    ClickGeo {
        country_code: location.country_code,
        city: location.city,
        region: location.region_name,
        lat: location.lat,
        lon: location.lon,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::{MockClickStore, MockLinkStore};
    use crate::infrastructure::cache::{KeyNamer, NullCacheDriver};

    fn make_ingestor() -> ClickIngestor<MockLinkStore, MockClickStore> {
        let mut link_store = MockLinkStore::new();
        link_store.expect_increment_click_count().returning(|_| Ok(()));
        let resolver = Arc::new(RedirectResolver::new(
            Arc::new(NullCacheDriver::new()),
            KeyNamer::new("test"),
            Arc::new(link_store),
            Duration::from_secs(60),
            Duration::from_secs(30),
        ));

        let mut click_store = MockClickStore::new();
        click_store.expect_insert().times(1).returning(|_| Ok(()));

        let geoip = Arc::new(GeoIpResolver::new(
            Arc::new(NullCacheDriver::new()),
            KeyNamer::new("test"),
            "http://localhost:0/unused",
            Duration::from_millis(50),
            Duration::from_secs(60),
        ));

        ClickIngestor::new(resolver, Arc::new(click_store), geoip, Duration::from_secs(5))
    }

    #[test]
    fn test_hash_ip_is_64_lowercase_hex_chars() {
        let hash = hash_ip("203.0.113.5");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_hash_ip_is_deterministic() {
        assert_eq!(hash_ip("203.0.113.5"), hash_ip("203.0.113.5"));
        assert_ne!(hash_ip("203.0.113.5"), hash_ip("203.0.113.6"));
    }

    #[tokio::test]
    async fn test_track_click_inserts_event_for_private_ip_without_network_call() {
        let ingestor = make_ingestor();
        ingestor
            .track_click(ClickMetadata {
                short_code: "abc123".to_string(),
                client_ip: Some("127.0.0.1".to_string()),
                user_agent: Some("Mozilla/5.0".to_string()),
                referrer: Some("https://google.com/search".to_string()),
            })
            .await;
    }

    #[tokio::test]
    async fn test_track_click_continues_without_geo_when_ip_absent() {
        let ingestor = make_ingestor();
        ingestor
            .track_click(ClickMetadata {
                short_code: "abc123".to_string(),
                client_ip: None,
                user_agent: None,
                referrer: None,
            })
            .await;
    }
}
