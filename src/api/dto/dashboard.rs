//! DTO for `GET /api/dashboard` (spec §6).
//!
//! The HTTP surface table in spec §6 names fields `total_link`/`total_click`
//! while the RPC wire format (also spec §6) uses `total_links`/`total_clicks`
//! -- a naming drift in the distillation. This DTO follows the HTTP table
//! since it is what crosses the dashboard's actual wire; `L` translates from
//! the RPC-shaped [`crate::domain::entities::DashboardResponse`] at the
//! boundary, not before.

use serde::Serialize;

use crate::domain::entities::{DashboardResponse, DashboardStatus, StatLink, TopLink};

#[derive(Debug, Serialize)]
pub struct TopLinkDto {
    pub short_url: String,
    pub original_url: String,
    pub clicks: i64,
    pub status: String,
}

impl From<TopLink> for TopLinkDto {
    fn from(t: TopLink) -> Self {
        Self {
            short_url: t.short_url,
            original_url: t.original_url,
            clicks: t.clicks,
            status: t.status,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatLinkDto {
    pub date: String,
    pub clicks: i64,
}

impl From<StatLink> for StatLinkDto {
    fn from(s: StatLink) -> Self {
        Self { date: s.date, clicks: s.clicks }
    }
}

#[derive(Debug, Serialize)]
pub struct DashboardDto {
    pub total_link: i64,
    pub total_click: i64,
    pub uniq_visitors: i64,
    pub top_links: Vec<TopLinkDto>,
    pub stat_links: Vec<StatLinkDto>,
    /// Caller-visible advisory flag, set when the upstream analytics
    /// service degraded the reply to `status: "limited"` (spec §4.L step 6).
    pub limited: bool,
}

impl From<DashboardResponse> for DashboardDto {
    fn from(d: DashboardResponse) -> Self {
        Self {
            total_link: d.total_links,
            total_click: d.total_clicks,
            uniq_visitors: d.uniq_visitors,
            top_links: d.top_links.into_iter().map(Into::into).collect(),
            stat_links: d.stat_links.into_iter().map(Into::into).collect(),
            limited: d.status == DashboardStatus::Limited,
        }
    }
}
