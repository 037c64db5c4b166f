//! Dashboard payload shapes (spec §4.L, §6 RPC wire format).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopLink {
    pub short_url: String,
    pub original_url: String,
    pub clicks: i64,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatLink {
    pub date: String,
    pub clicks: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DashboardStatus {
    Success,
    Limited,
    Error,
}

/// The reply body from the external analytics service, relayed through G
/// and cached by L (spec §4.L, §6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub user_id: i64,
    pub total_clicks: i64,
    pub total_links: i64,
    pub uniq_visitors: i64,
    pub top_links: Vec<TopLink>,
    pub stat_links: Vec<StatLink>,
    pub status: DashboardStatus,
    pub message: Option<String>,
}
