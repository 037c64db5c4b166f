//! Pure user-agent parsing (spec §4.F).
//!
//! `parse_ua` never performs I/O and is deterministic: the same input string
//! always produces the same [`ParsedUserAgent`], byte-for-byte (spec §8).

use crate::domain::entities::DeviceType;

/// Result of parsing a raw `User-Agent` header.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedUserAgent {
    pub device_type: DeviceType,
    pub browser_name: Option<String>,
    pub browser_version: Option<String>,
    pub os_name: Option<String>,
    pub os_version: Option<String>,
    pub is_bot: bool,
}

/// Parses a raw user-agent string into device/browser/OS facets.
///
/// `deviceType` is the first true among `mobile, tablet, desktop`, else
/// `unknown` (spec §4.F).
pub fn parse_ua(raw: &str) -> ParsedUserAgent {
    let parsed = woothee::parser::Parser::new().parse(raw);

    let Some(result) = parsed else {
        return ParsedUserAgent {
            device_type: DeviceType::Unknown,
            browser_name: None,
            browser_version: None,
            os_name: None,
            os_version: None,
            is_bot: false,
        };
    };

    let device_type = match result.category {
        "smartphone" => DeviceType::Mobile,
        "mobilephone" => DeviceType::Mobile,
        "tablet" => DeviceType::Tablet,
        "pc" => DeviceType::Desktop,
        _ => DeviceType::Unknown,
    };

    let none_if_unknown = |s: &str| {
        if s.is_empty() || s == "UNKNOWN" {
            None
        } else {
            Some(s.to_string())
        }
    };

    ParsedUserAgent {
        device_type,
        browser_name: none_if_unknown(result.name),
        browser_version: none_if_unknown(result.version),
        os_name: none_if_unknown(result.os),
        os_version: none_if_unknown(result.os_version.as_ref()),
        is_bot: result.category == "crawler",
    }
}

/// Strips the `http(s)://` prefix from a URL and returns everything before
/// the first `/`, i.e. the registrable host. Empty input yields empty
/// output (spec §4.F).
pub fn extract_domain(url: &str) -> String {
    let without_scheme = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);

    match without_scheme.find('/') {
        Some(idx) => without_scheme[..idx].to_string(),
        None => without_scheme.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ua_is_pure() {
        let ua = "Mozilla/5.0 (iPhone; CPU iPhone OS 15_0 like Mac OS X) AppleWebKit/605.1.15";
        assert_eq!(parse_ua(ua), parse_ua(ua));
    }

    #[test]
    fn test_parse_ua_desktop_chrome() {
        let ua = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
        let parsed = parse_ua(ua);
        assert_eq!(parsed.device_type, DeviceType::Desktop);
        assert!(!parsed.is_bot);
    }

    #[test]
    fn test_parse_ua_unknown_string_defaults_unknown_device() {
        let parsed = parse_ua("");
        assert_eq!(parsed.device_type, DeviceType::Unknown);
        assert!(!parsed.is_bot);
    }

    #[test]
    fn test_parse_ua_bot_detected() {
        let ua = "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)";
        let parsed = parse_ua(ua);
        assert!(parsed.is_bot);
    }

    #[test]
    fn test_extract_domain_strips_https() {
        assert_eq!(extract_domain("https://example.com/path"), "example.com");
    }

    #[test]
    fn test_extract_domain_strips_http() {
        assert_eq!(extract_domain("http://example.com/path?x=1"), "example.com");
    }

    #[test]
    fn test_extract_domain_no_path() {
        assert_eq!(extract_domain("https://example.com"), "example.com");
    }

    #[test]
    fn test_extract_domain_empty_input_yields_empty_output() {
        assert_eq!(extract_domain(""), "");
    }

    #[test]
    fn test_extract_domain_subdomain() {
        assert_eq!(extract_domain("https://api.example.com/v1"), "api.example.com");
    }
}
