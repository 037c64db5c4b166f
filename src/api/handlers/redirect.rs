//! Handlers for `GET /r/{shortUrl}` and `GET /api/info/{shortUrl}` (spec §6,
//! §4.J, §4.K).

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Path, State};
use axum::http::{HeaderMap, header};

use crate::api::dto::envelope::ApiResponse;
use crate::api::dto::redirect::RedirectResponse;
use crate::domain::entities::ClickMetadata;
use crate::error::AppError;
use crate::state::RedirectState;
use crate::utils::url_normalizer::display_original_url;

const MAX_SHORT_URL_LEN: usize = 50;

/// `shortUrl` length 0 or >50 is `INVALID_INPUT` (spec §6, §8).
fn validate_short_url(short_url: &str) -> Result<(), AppError> {
    if short_url.is_empty() || short_url.chars().count() > MAX_SHORT_URL_LEN {
        return Err(AppError::invalid_input("shortUrl must be 1-50 characters"));
    }
    Ok(())
}

/// Prefers the first hop of `X-Forwarded-For` (set by a trusted reverse
/// proxy in front of this service) and falls back to the socket's peer
/// address. Per spec §9's open question, the click ingestor always uses
/// this real client IP, never a hard-coded test value.
fn client_ip(headers: &HeaderMap, peer: SocketAddr) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .unwrap_or_else(|| peer.ip().to_string())
}

/// `GET /r/{shortUrl}` (spec §6): resolves and returns the original URL,
/// then spawns click ingestion on an independent, request-detached task so
/// a client disconnect can't cancel it (spec §4.O, §5).
pub async fn redirect_handler(
    State(state): State<RedirectState>,
    Path(short_url): Path<String>,
    headers: HeaderMap,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
) -> Result<ApiResponse<RedirectResponse>, AppError> {
    validate_short_url(&short_url)?;

    let projection = state.redirect_resolver.get_url(&short_url).await?;

    let metadata = ClickMetadata {
        short_code: short_url.clone(),
        client_ip: Some(client_ip(&headers, peer)),
        user_agent: headers.get(header::USER_AGENT).and_then(|v| v.to_str().ok()).map(String::from),
        referrer: headers.get(header::REFERER).and_then(|v| v.to_str().ok()).map(String::from),
    };

    let ingestor = state.click_ingestor.clone();
    let original_url = display_original_url(&projection.original_url);
    tokio::spawn(async move {
        ingestor.track_click(metadata).await;
    });

    Ok(ApiResponse::ok(RedirectResponse { original_url }))
}

/// `GET /api/info/{shortUrl}` (spec §6): same resolution as the redirect
/// route, without the click-tracking side effect -- this is a lookup, not a
/// resolution event.
pub async fn info_handler(
    State(state): State<RedirectState>,
    Path(short_url): Path<String>,
) -> Result<ApiResponse<RedirectResponse>, AppError> {
    validate_short_url(&short_url)?;
    let projection = state.redirect_resolver.get_url(&short_url).await?;
    Ok(ApiResponse::ok(RedirectResponse {
        original_url: display_original_url(&projection.original_url),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_short_url_is_invalid() {
        assert!(validate_short_url("").is_err());
    }

    #[test]
    fn test_51_char_short_url_is_invalid() {
        let code = "a".repeat(51);
        assert!(validate_short_url(&code).is_err());
    }

    #[test]
    fn test_6_char_short_url_is_valid() {
        assert!(validate_short_url("abc123").is_ok());
    }

    #[test]
    fn test_50_char_short_url_is_valid() {
        let code = "a".repeat(50);
        assert!(validate_short_url(&code).is_ok());
    }

    #[test]
    fn test_client_ip_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "203.0.113.5, 10.0.0.1".parse().unwrap());
        let peer: SocketAddr = "127.0.0.1:8080".parse().unwrap();
        assert_eq!(client_ip(&headers, peer), "203.0.113.5");
    }

    #[test]
    fn test_client_ip_falls_back_to_peer() {
        let headers = HeaderMap::new();
        let peer: SocketAddr = "198.51.100.7:8080".parse().unwrap();
        assert_eq!(client_ip(&headers, peer), "198.51.100.7");
    }
}
