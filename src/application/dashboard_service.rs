//! Dashboard service (spec §4.L): read-through cache in front of the RPC
//! client (G), consuming the invalidation flag J raises to force a refresh.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::entities::{DashboardResponse, DashboardStatus};
use crate::error::{AppError, ErrorKind};
use crate::infrastructure::cache::{CacheDriver, CacheDriverExt, CacheOutcome, KeyNamer};
use crate::infrastructure::rpc_client::SharedRpcClient;

/// The RPC client surfaces its own kinds (`RequestTimeout` on timeout,
/// `QueueError` on a broker fault). To the dashboard's caller both are the
/// same thing: the external analytics service didn't answer (spec §8
/// scenario 6 expects 503 `EXTERNAL_SERVICE_ERROR`, not 408/500).
fn into_external_service_error(err: AppError) -> AppError {
    match err.kind() {
        ErrorKind::RequestTimeout | ErrorKind::QueueError => {
            AppError::external_service_error("Dashboard analytics service did not respond").wrap(err)
        }
        _ => err,
    }
}

pub struct DashboardService {
    cache: Arc<dyn CacheDriver>,
    keys: KeyNamer,
    rpc: SharedRpcClient,
    dashboard_queue: String,
    cache_ttl: Duration,
    rpc_timeout: Duration,
}

impl DashboardService {
    pub fn new(
        cache: Arc<dyn CacheDriver>,
        keys: KeyNamer,
        rpc: SharedRpcClient,
        dashboard_queue: impl Into<String>,
        cache_ttl: Duration,
        rpc_timeout: Duration,
    ) -> Self {
        Self {
            cache,
            keys,
            rpc,
            dashboard_queue: dashboard_queue.into(),
            cache_ttl,
            rpc_timeout,
        }
    }

    /// Implements spec §4.L's seven-step algorithm.
    pub async fn get_dashboard(&self, owner_id: i64) -> Result<DashboardResponse, AppError> {
        if owner_id <= 0 {
            return Err(AppError::invalid_input("ownerId must be positive"));
        }

        let cache_key = self.keys.dashboard(owner_id);
        let flag_key = self.keys.dashboard_invalid(owner_id);

        let forced_refresh = self.cache.exists(&flag_key).await?;
        if forced_refresh {
            self.cache.delete(&flag_key).await?;
        } else if let CacheOutcome::Hit(cached) = self.cache.get::<DashboardResponse>(&cache_key).await? {
            self.cache.refresh_ttl(&cache_key, self.cache_ttl).await?;
            return Ok(cached);
        }

        let request = serde_json::json!({ "user_id": owner_id });
        let payload = serde_json::to_vec(&request)
            .map_err(|e| AppError::internal("Failed to encode dashboard request").wrap(e))?;

        let reply = self
            .rpc
            .call(&self.dashboard_queue, &payload, self.rpc_timeout)
            .await
            .map_err(into_external_service_error)?;

        let response: DashboardResponse = serde_json::from_slice(&reply)
            .map_err(|e| AppError::external_service_error("Malformed dashboard reply").wrap(e))?;

        if response.status == DashboardStatus::Error {
            return Err(AppError::external_service_error(
                response.message.clone().unwrap_or_else(|| "Dashboard service error".to_string()),
            ));
        }

        // Cached even when limited (spec §4.L step 7): a degraded payload is
        // still better than another round trip on the next request.
        self.cache.set(&cache_key, &response, self.cache_ttl).await?;

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{StatLink, TopLink};
    use crate::infrastructure::cache::MockCacheDriver;

    fn sample_response(status: DashboardStatus) -> DashboardResponse {
        DashboardResponse {
            user_id: 42,
            total_clicks: 10,
            total_links: 3,
            uniq_visitors: 7,
            top_links: vec![TopLink {
                short_url: "abc123".to_string(),
                original_url: "https://example.com".to_string(),
                clicks: 5,
                status: "active".to_string(),
            }],
            stat_links: vec![StatLink { date: "2026-07-01".to_string(), clicks: 2 }],
            status,
            message: None,
        }
    }

    #[tokio::test]
    async fn test_rpc_timeout_maps_to_external_service_error() {
        let mut cache = MockCacheDriver::new();
        cache.expect_exists().times(1).returning(|_| Ok(false));
        cache.expect_get_json().times(1).returning(|_| Ok(CacheOutcome::Miss));

        let mut rpc = crate::infrastructure::rpc_client::MockRpcCaller::new();
        rpc.expect_call()
            .times(1)
            .returning(|_, _, _| Err(AppError::request_timeout("RPC call timed out")));
        let rpc: SharedRpcClient = Arc::new(rpc);

        let service = DashboardService::new(
            Arc::new(cache),
            KeyNamer::new("test"),
            rpc,
            "dashboard_request",
            Duration::from_secs(60),
            Duration::from_secs(1),
        );

        let err = service.get_dashboard(42).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ExternalServiceError);
    }

    #[tokio::test]
    async fn test_rejects_non_positive_owner_id() {
        let cache = MockCacheDriver::new();
        let rpc: SharedRpcClient = Arc::new(crate::infrastructure::rpc_client::MockRpcCaller::new());
        let service = DashboardService::new(
            Arc::new(cache),
            KeyNamer::new("test"),
            rpc,
            "dashboard_request",
            Duration::from_secs(60),
            Duration::from_secs(5),
        );

        let err = service.get_dashboard(0).await.unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn test_cache_hit_without_flag_skips_rpc_and_refreshes_ttl() {
        let mut cache = MockCacheDriver::new();
        cache.expect_exists().times(1).returning(|_| Ok(false));
        let response = sample_response(DashboardStatus::Success);
        let json = serde_json::to_value(&response).unwrap();
        cache.expect_get_json().times(1).returning(move |_| Ok(CacheOutcome::Hit(json.clone())));
        cache.expect_refresh_ttl().times(1).returning(|_, _| Ok(()));

        let rpc: SharedRpcClient = Arc::new(crate::infrastructure::rpc_client::MockRpcCaller::new());
        let service = DashboardService::new(
            Arc::new(cache),
            KeyNamer::new("test"),
            rpc,
            "dashboard_request",
            Duration::from_secs(60),
            Duration::from_secs(5),
        );

        let result = service.get_dashboard(42).await.unwrap();
        assert_eq!(result.user_id, 42);
    }
}
