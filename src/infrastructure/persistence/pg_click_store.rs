//! PostgreSQL implementation of the click store (spec §4.D).

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{ClickEvent, DeviceType};
use crate::domain::repositories::ClickStore;
use crate::error::AppError;

pub struct PgClickStore {
    pool: Arc<PgPool>,
}

impl PgClickStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

fn device_type_str(d: DeviceType) -> &'static str {
    match d {
        DeviceType::Mobile => "mobile",
        DeviceType::Tablet => "tablet",
        DeviceType::Desktop => "desktop",
        DeviceType::Unknown => "unknown",
    }
}

#[async_trait]
impl ClickStore for PgClickStore {
    /// Unconditionally appends; spec §4.D and §7 require failures here to
    /// never propagate back to the request handler, so this returns its own
    /// `AppError` for the caller to log and swallow rather than panicking.
    async fn insert(&self, event: ClickEvent) -> Result<(), AppError> {
        let (country_code, city, region, lat, lon) = match &event.geo {
            Some(geo) => (
                Some(geo.country_code.clone()),
                Some(geo.city.clone()),
                Some(geo.region.clone()),
                Some(geo.lat),
                Some(geo.lon),
            ),
            None => (None, None, None, None, None),
        };

        sqlx::query!(
            r#"
            INSERT INTO click_events (
                clicked_at, short_code, ip_address_hash, user_agent, referrer_url,
                referrer_domain, device_type, browser_name, browser_version,
                os_name, os_version, is_bot, country_code, city, region, lat, lon
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            "#,
            event.clicked_at,
            event.short_code,
            event.ip_address_hash,
            event.user_agent,
            event.referrer_url,
            event.referrer_domain,
            device_type_str(event.device_type),
            event.browser_name,
            event.browser_version,
            event.os_name,
            event.os_version,
            event.is_bot,
            country_code,
            city,
            region,
            lat,
            lon,
        )
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }
}
