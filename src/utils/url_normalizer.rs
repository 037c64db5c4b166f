//! URL normalization (spec §3).
//!
//! Ensures a consistent `originalUrl` representation: host lower-cased,
//! default ports stripped, trailing `/` removed unless root — query and
//! fragment are preserved verbatim.

use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum UrlNormalizationError {
    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,

    #[error("Failed to normalize URL: {0}")]
    NormalizationFailed(String),
}

/// Normalizes a URL to its canonical form (spec §3).
///
/// - Scheme: only `http`/`https` accepted.
/// - Host: lower-cased.
/// - Default ports (80 for http, 443 for https): stripped.
/// - Trailing `/`: removed unless the path is root.
/// - Query and fragment: preserved verbatim.
///
/// Idempotent: `normalize(normalize(u)) == normalize(u)` (spec §8).
pub fn normalize_url(input: &str) -> Result<String, UrlNormalizationError> {
    let mut url =
        Url::parse(input).map_err(|e| UrlNormalizationError::InvalidFormat(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        _ => return Err(UrlNormalizationError::UnsupportedProtocol),
    }

    if let Some(host) = url.host_str() {
        let host_lowercase = host.to_ascii_lowercase();
        url.set_host(Some(&host_lowercase)).map_err(|_| {
            UrlNormalizationError::NormalizationFailed("Failed to set normalized host".to_string())
        })?;
    }

    let is_default_port = matches!(
        (url.scheme(), url.port()),
        ("http", Some(80)) | ("https", Some(443))
    );
    if is_default_port {
        url.set_port(None).map_err(|_| {
            UrlNormalizationError::NormalizationFailed("Failed to remove default port".to_string())
        })?;
    }

    if url.path().len() > 1 && url.path().ends_with('/') {
        let trimmed = url.path().trim_end_matches('/').to_string();
        url.set_path(&trimmed);
    }

    Ok(url.to_string())
}

/// Renders a stored, normalized `originalUrl` for an outward-facing
/// response body. `normalize_url` deliberately keeps a root path's `/` in
/// storage (it's the canonical form `url::Url` round-trips through), but
/// spec §8 scenario 1 expects the redirect/info responses to hand back
/// `"https://example.com"`, not `"https://example.com/"`. This trims that
/// single root slash without touching any query or fragment that follows
/// it; non-root paths are returned unchanged.
pub fn display_original_url(stored_url: &str) -> String {
    match Url::parse(stored_url) {
        Ok(parsed) if parsed.path() == "/" => {
            let prefix = &parsed[..url::Position::BeforePath];
            let suffix = &parsed[url::Position::AfterPath..];
            format!("{prefix}{suffix}")
        }
        _ => stored_url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_simple_http() {
        assert_eq!(normalize_url("http://example.com").unwrap(), "http://example.com/");
    }

    #[test]
    fn test_normalize_uppercase_host() {
        assert_eq!(
            normalize_url("https://EXAMPLE.COM/path").unwrap(),
            "https://example.com/path"
        );
    }

    #[test]
    fn test_normalize_remove_default_http_port() {
        assert_eq!(
            normalize_url("http://example.com:80/path").unwrap(),
            "http://example.com/path"
        );
    }

    #[test]
    fn test_normalize_remove_default_https_port() {
        assert_eq!(
            normalize_url("https://example.com:443/path").unwrap(),
            "https://example.com/path"
        );
    }

    #[test]
    fn test_normalize_keep_custom_port() {
        assert_eq!(
            normalize_url("http://example.com:8080/path").unwrap(),
            "http://example.com:8080/path"
        );
    }

    #[test]
    fn test_normalize_preserves_fragment() {
        assert_eq!(
            normalize_url("https://example.com/page#section").unwrap(),
            "https://example.com/page#section"
        );
    }

    #[test]
    fn test_normalize_preserves_query_and_fragment_together() {
        assert_eq!(
            normalize_url("https://example.com/page?key=value#section").unwrap(),
            "https://example.com/page?key=value#section"
        );
    }

    #[test]
    fn test_normalize_preserve_query_params() {
        assert_eq!(
            normalize_url("https://example.com/search?q=rust&lang=en").unwrap(),
            "https://example.com/search?q=rust&lang=en"
        );
    }

    #[test]
    fn test_normalize_trailing_slash_stripped() {
        assert_eq!(
            normalize_url("https://example.com/path/").unwrap(),
            "https://example.com/path"
        );
    }

    #[test]
    fn test_normalize_root_slash_kept() {
        assert_eq!(normalize_url("https://example.com/").unwrap(), "https://example.com/");
    }

    #[test]
    fn test_normalize_invalid_url() {
        assert!(matches!(
            normalize_url("not a valid url").unwrap_err(),
            UrlNormalizationError::InvalidFormat(_)
        ));
    }

    #[test]
    fn test_normalize_ftp_protocol_rejected() {
        assert!(matches!(
            normalize_url("ftp://example.com/file.txt").unwrap_err(),
            UrlNormalizationError::UnsupportedProtocol
        ));
    }

    #[test]
    fn test_normalize_javascript_protocol_rejected() {
        assert!(matches!(
            normalize_url("javascript:alert('xss')").unwrap_err(),
            UrlNormalizationError::UnsupportedProtocol
        ));
    }

    #[test]
    fn test_normalize_data_protocol_rejected() {
        assert!(matches!(
            normalize_url("data:text/plain,Hello").unwrap_err(),
            UrlNormalizationError::UnsupportedProtocol
        ));
    }

    #[test]
    fn test_normalize_empty_string() {
        assert!(matches!(
            normalize_url("").unwrap_err(),
            UrlNormalizationError::InvalidFormat(_)
        ));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = normalize_url("HTTPS://EXAMPLE.COM:443/Path/?key=VALUE#anchor").unwrap();
        let twice = normalize_url(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_display_original_url_strips_root_slash() {
        assert_eq!(display_original_url("https://example.com/"), "https://example.com");
    }

    #[test]
    fn test_display_original_url_leaves_non_root_path_untouched() {
        assert_eq!(
            display_original_url("https://example.com/path"),
            "https://example.com/path"
        );
    }

    #[test]
    fn test_display_original_url_preserves_query_on_root_path() {
        assert_eq!(
            display_original_url("https://example.com/?key=value"),
            "https://example.com?key=value"
        );
    }

    #[test]
    fn test_display_original_url_passes_through_unparseable_input() {
        assert_eq!(display_original_url("not a url"), "not a url");
    }
}
