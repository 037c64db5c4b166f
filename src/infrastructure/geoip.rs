//! Geo-IP resolver (spec §4.E): external lookup with private-range bypass,
//! per-IP caching, per-request timeout.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::domain::entities::GeoLocation;
use crate::error::AppError;
use crate::infrastructure::cache::{CacheDriver, CacheDriverExt, CacheOutcome, KeyNamer};

/// True for loopback, `10.0.0.0/8`, `172.16.0.0/12`, and `192.168.0.0/16`
/// addresses (spec §4.E step 1, §8 invariant).
pub fn is_private_ip(ip: &str) -> bool {
    match ip.parse::<IpAddr>() {
        Ok(IpAddr::V4(v4)) => {
            v4.is_loopback()
                || v4.octets()[0] == 10
                || (v4.octets()[0] == 172 && (16..=31).contains(&v4.octets()[1]))
                || (v4.octets()[0] == 192 && v4.octets()[1] == 168)
        }
        Ok(IpAddr::V6(v6)) => v6.is_loopback(),
        Err(_) => false,
    }
}

#[derive(Debug, Deserialize)]
struct GeoApiResponse {
    status: String,
    message: Option<String>,
    #[serde(flatten)]
    location: GeoLocation,
}

pub struct GeoIpResolver {
    http: reqwest::Client,
    cache: Arc<dyn CacheDriver>,
    keys: KeyNamer,
    endpoint: String,
    timeout: Duration,
    ttl: Duration,
}

impl GeoIpResolver {
    pub fn new(
        cache: Arc<dyn CacheDriver>,
        keys: KeyNamer,
        endpoint: impl Into<String>,
        timeout: Duration,
        ttl: Duration,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            cache,
            keys,
            endpoint: endpoint.into(),
            timeout,
            ttl,
        }
    }

    /// Resolves `ip` to a [`GeoLocation`], per spec §4.E's four-step
    /// algorithm: private-range bypass, cache lookup with TTL refresh,
    /// external call on miss, cache populate on success.
    pub async fn get_location(&self, ip: &str) -> Result<GeoLocation, AppError> {
        if is_private_ip(ip) {
            return Ok(GeoLocation::local(ip));
        }

        let key = self.keys.geoip(ip);

        if let CacheOutcome::Hit(location) = self.cache.get::<GeoLocation>(&key).await? {
            self.cache.refresh_ttl(&key, self.ttl).await?;
            return Ok(location);
        }

        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("query", ip)])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| AppError::external_service_error("Geo-IP lookup failed").wrap(e))?;

        if !response.status().is_success() {
            return Err(AppError::external_service_error("Geo-IP service returned an error")
                .with_context("status", response.status().as_u16()));
        }

        let payload: GeoApiResponse = response
            .json()
            .await
            .map_err(|e| AppError::external_service_error("Malformed geo-IP response").wrap(e))?;

        if payload.status != "success" {
            return Err(AppError::external_service_error(
                payload.message.unwrap_or_else(|| "Geo-IP lookup failed".to_string()),
            ));
        }

        self.cache.set(&key, &payload.location, self.ttl).await?;
        Ok(payload.location)
    }
}
