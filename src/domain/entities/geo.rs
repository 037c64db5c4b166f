//! Geo-IP cache entry (spec §3 "GeoLocation cache entry", §4.E).

use serde::{Deserialize, Serialize};

/// The sentinel returned for private/loopback addresses without a network
/// call (spec §4.E step 1).
pub const LOCAL_COUNTRY: &str = "Local";
pub const LOCAL_COUNTRY_CODE: &str = "XX";
pub const LOCAL_CITY: &str = "Localhost";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub country: String,
    #[serde(rename = "countryCode")]
    pub country_code: String,
    pub region: String,
    #[serde(rename = "regionName")]
    pub region_name: String,
    pub city: String,
    pub zip: String,
    pub lat: f64,
    pub lon: f64,
    pub timezone: String,
    pub isp: String,
    pub org: String,
    #[serde(rename = "as")]
    pub asn: String,
    pub query: String,
}

impl GeoLocation {
    /// The sentinel for private/loopback IPs (spec §4.E step 1).
    pub fn local(query: &str) -> Self {
        Self {
            country: LOCAL_COUNTRY.to_string(),
            country_code: LOCAL_COUNTRY_CODE.to_string(),
            region: String::new(),
            region_name: String::new(),
            city: LOCAL_CITY.to_string(),
            zip: String::new(),
            lat: 0.0,
            lon: 0.0,
            timezone: String::new(),
            isp: String::new(),
            org: String::new(),
            asn: String::new(),
            query: query.to_string(),
        }
    }
}
