//! Entry point for the authoring service (spec §11): link creation and
//! collision metrics behind a Bearer-authenticated API.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;

use url_shortener_core::application::allocator::ShortCodeAllocator;
use url_shortener_core::application::link_authoring::LinkAuthoringService;
use url_shortener_core::application::token_verifier::TokenVerifier;
use url_shortener_core::api::routes::authoring_router;
use url_shortener_core::bootstrap;
use url_shortener_core::config::Config;
use url_shortener_core::infrastructure::persistence::PgLinkStore;
use url_shortener_core::state::AuthoringState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cfg = Config::from_env()?;
    bootstrap::init_tracing(&cfg);
    cfg.print_summary();

    let pool = bootstrap::connect_postgres(&cfg).await?;
    let pool = Arc::new(pool);

    let link_store = Arc::new(PgLinkStore::new(pool.clone()));
    let allocator = Arc::new(ShortCodeAllocator::new(link_store.clone()));
    let link_authoring = Arc::new(LinkAuthoringService::new(
        allocator.clone(),
        cfg.url_default_ttl_days,
    ));
    let token_verifier = Arc::new(TokenVerifier::new(&cfg.jwt_secret, cfg.jwt_issuer.clone()));

    let state = AuthoringState { link_authoring, allocator, token_verifier };

    let app = authoring_router(state);

    let listener = tokio::net::TcpListener::bind(cfg.listen_addr()).await?;
    tracing::info!(addr = %cfg.listen_addr(), "authoring service listening");

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(bootstrap::shutdown_signal())
        .await?;

    Ok(())
}
