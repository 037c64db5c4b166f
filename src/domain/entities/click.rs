//! Click entities: the raw request metadata captured by the boundary (O)
//! and the enriched, append-only event persisted by the click store (D).
//! See spec §3 "ClickEvent" and §4.K.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Device family derived from the user agent (spec §4.F).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Mobile,
    Tablet,
    Desktop,
    Unknown,
}

/// Raw metadata captured at the request boundary, before enrichment.
/// This is what O hands to K ([`crate::application::click_ingestor`]).
#[derive(Debug, Clone)]
pub struct ClickMetadata {
    pub short_code: String,
    pub client_ip: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
}

/// Geo-IP fields attached to a click event. Per spec §3, these are either
/// all present or the whole group is absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClickGeo {
    pub country_code: String,
    pub city: String,
    pub region: String,
    pub lat: f64,
    pub lon: f64,
}

/// Append-only, fully enriched click event (spec §3).
#[derive(Debug, Clone, Serialize)]
pub struct ClickEvent {
    pub clicked_at: DateTime<Utc>,
    pub short_code: String,
    pub ip_address_hash: String,
    pub user_agent: Option<String>,
    pub referrer_url: Option<String>,
    pub referrer_domain: Option<String>,
    pub device_type: DeviceType,
    pub browser_name: Option<String>,
    pub browser_version: Option<String>,
    pub os_name: Option<String>,
    pub os_version: Option<String>,
    pub is_bot: bool,
    pub geo: Option<ClickGeo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_event_is_bot_defaults_false_when_constructed_manually() {
        let event = ClickEvent {
            clicked_at: Utc::now(),
            short_code: "abc123".to_string(),
            ip_address_hash: "0".repeat(64),
            user_agent: None,
            referrer_url: None,
            referrer_domain: None,
            device_type: DeviceType::Unknown,
            browser_name: None,
            browser_version: None,
            os_name: None,
            os_version: None,
            is_bot: false,
            geo: None,
        };
        assert!(!event.is_bot);
    }

    #[test]
    fn test_ip_address_hash_is_64_hex_chars() {
        let hash = "a".repeat(64);
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
