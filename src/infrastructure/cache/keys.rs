//! Key namer (spec §4.B): single source of truth for cache key strings.
//!
//! Every key has the form `{appPrefix}:{family}:{id}`.

/// Builds cache keys for every cached entity family behind one namespace
/// prefix, defaulting to the service name (spec §4.B).
#[derive(Debug, Clone)]
pub struct KeyNamer {
    app_prefix: String,
}

impl KeyNamer {
    pub fn new(app_prefix: impl Into<String>) -> Self {
        Self { app_prefix: app_prefix.into() }
    }

    /// `url:{shortCode}` -- the redirect hot-path projection key.
    pub fn url(&self, short_code: &str) -> String {
        format!("{}:url:{}", self.app_prefix, short_code)
    }

    /// `dashboard:{ownerId}` -- the cached dashboard payload.
    pub fn dashboard(&self, owner_id: i64) -> String {
        format!("{}:dashboard:{}", self.app_prefix, owner_id)
    }

    /// `dashboard_invalid:{ownerId}` -- the invalidation flag.
    pub fn dashboard_invalid(&self, owner_id: i64) -> String {
        format!("{}:dashboard_invalid:{}", self.app_prefix, owner_id)
    }

    /// `geoip:{ip}` -- the geo-IP resolution cache.
    pub fn geoip(&self, ip: &str) -> String {
        format!("{}:geoip:{}", self.app_prefix, ip)
    }
}
