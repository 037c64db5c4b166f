//! Shared startup/shutdown plumbing for the two binaries (spec §7's
//! "orderly shutdown" and fatal-startup conditions; spec §9 singleton
//! lifecycle note: `Init(config)` at startup, `Close()` in LIFO order).

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::infrastructure::cache::{CacheDriver, NullCacheDriver, RedisCacheDriver};

/// Initializes `tracing` with the configured format (text in development,
/// JSON in production, per [`Config::log_format`]).
pub fn init_tracing(cfg: &Config) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match cfg.log_format() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}

/// Opens the store's connection pool and runs pending migrations. A
/// connection or migration failure is fatal at startup (spec §7).
pub async fn connect_postgres(cfg: &Config) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .min_connections(cfg.db_min_pool_size)
        .max_connections(cfg.db_max_pool_size)
        .acquire_timeout(cfg.db_connect_timeout)
        .connect(&cfg.database_url)
        .await
        .context("failed to connect to the store")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("failed to run pending migrations")?;

    tracing::info!("connected to store, migrations up to date");
    Ok(pool)
}

/// Connects to the cache, falling back to [`NullCacheDriver`] so a down
/// cache degrades the hot path (store reads on every request) instead of
/// failing startup -- the cache is best-effort everywhere it's consulted
/// (spec §4.A, §7).
pub async fn connect_cache(cfg: &Config) -> Arc<dyn CacheDriver> {
    match RedisCacheDriver::connect(&cfg.redis_url()).await {
        Ok(driver) => {
            tracing::info!("connected to cache");
            Arc::new(driver)
        }
        Err(e) => {
            tracing::warn!(error = ?e, "cache unavailable, falling back to NullCacheDriver");
            Arc::new(NullCacheDriver::new())
        }
    }
}

/// Resolves on Ctrl-C (all platforms) or `SIGTERM` (Unix), for graceful
/// shutdown (spec §7: "Shutdown is orderly").
pub async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}

/// Shared HTTP client timeout default for outbound calls that don't
/// otherwise specify one (used as a sane floor, not a ceiling, by E and G's
/// per-call timeouts).
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);
