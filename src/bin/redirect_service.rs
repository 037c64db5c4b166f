//! Entry point for the redirect service (spec §11): the hot redirect path,
//! click ingestion, and the cache-fronted dashboard.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;

use url_shortener_core::application::click_ingestor::ClickIngestor;
use url_shortener_core::application::dashboard_service::DashboardService;
use url_shortener_core::application::redirect_resolver::RedirectResolver;
use url_shortener_core::application::token_verifier::TokenVerifier;
use url_shortener_core::api::routes::redirect_router;
use url_shortener_core::bootstrap;
use url_shortener_core::config::Config;
use url_shortener_core::infrastructure::cache::KeyNamer;
use url_shortener_core::infrastructure::geoip::GeoIpResolver;
use url_shortener_core::infrastructure::persistence::{PgClickStore, PgLinkStore};
use url_shortener_core::infrastructure::rpc_client::RpcClient;
use url_shortener_core::state::RedirectState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cfg = Config::from_env()?;
    bootstrap::init_tracing(&cfg);
    cfg.print_summary();

    let pool = bootstrap::connect_postgres(&cfg).await?;
    let pool = Arc::new(pool);
    let cache = bootstrap::connect_cache(&cfg).await;

    let link_store = Arc::new(PgLinkStore::new(pool.clone()));
    let click_store = Arc::new(PgClickStore::new(pool.clone()));
    let keys = KeyNamer::new(cfg.cache_key_prefix.clone());

    let redirect_resolver = Arc::new(RedirectResolver::new(
        cache.clone(),
        keys.clone(),
        link_store.clone(),
        cfg.cache_ttl,
        cfg.invalidation_flag_ttl,
    ));

    let geoip = Arc::new(GeoIpResolver::new(
        cache.clone(),
        keys.clone(),
        cfg.geoip_endpoint.clone(),
        cfg.geoip_timeout,
        cfg.cache_ttl,
    ));

    let click_ingestor = Arc::new(ClickIngestor::new(
        redirect_resolver.clone(),
        click_store,
        geoip,
        cfg.click_tracking_timeout,
    ));

    let rpc_client: Arc<dyn url_shortener_core::infrastructure::rpc_client::RpcCaller> =
        Arc::new(RpcClient::connect(&cfg.rabbitmq_url).await?);

    let dashboard_service = Arc::new(DashboardService::new(
        cache,
        keys,
        rpc_client,
        cfg.queue_dashboard_request.clone(),
        cfg.cache_ttl,
        cfg.rabbitmq_rpc_timeout,
    ));

    let token_verifier = Arc::new(TokenVerifier::new(&cfg.jwt_secret, cfg.jwt_issuer.clone()));

    let state = RedirectState { redirect_resolver, click_ingestor, dashboard_service, token_verifier };

    let app = redirect_router(state);

    let listener = tokio::net::TcpListener::bind(cfg.listen_addr()).await?;
    tracing::info!(addr = %cfg.listen_addr(), "redirect service listening");

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(bootstrap::shutdown_signal())
        .await?;

    Ok(())
}
