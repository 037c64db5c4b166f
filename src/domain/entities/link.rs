//! Link entity: the authoritative record mapping a short code to its
//! original URL (spec §3).

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Parsed-URL metadata stored alongside a [`Link`] (spec §3 `metadata`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkMetadata {
    pub domain: String,
    pub protocol: String,
    pub path: String,
}

/// Authoritative record for a shortened URL.
#[derive(Debug, Clone)]
pub struct Link {
    pub id: i64,
    pub short_code: String,
    pub original_url: String,
    pub custom_alias: Option<String>,
    pub owner_id: i64,
    pub click_count: i64,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub metadata: LinkMetadata,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Link {
    /// True once the link has been soft-deleted (spec §3 `isDeleted`).
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// True once `expiresAt` has passed (spec §3).
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|e| Utc::now() >= e)
    }

    /// Projects the hot-path subset cached by J (spec §3 "Link projection").
    pub fn to_projection(&self) -> LinkProjection {
        LinkProjection {
            original_url: self.original_url.clone(),
            is_active: self.is_active,
            owner_id: self.owner_id,
            expires_at: self.expires_at,
        }
    }
}

/// The minimal subset of [`Link`] returned on the redirect hot path
/// (spec §3 "Link projection", §4.C, §4.J). This is the only shape the
/// cache (A) ever stores for the `url:{shortCode}` family.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LinkProjection {
    #[serde(rename = "originalUrl")]
    pub original_url: String,
    #[serde(rename = "isActive")]
    pub is_active: bool,
    #[serde(rename = "ownerId")]
    pub owner_id: i64,
    #[serde(rename = "expiresAt")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Input to the link store's insert (spec §4.C, §4.I).
#[derive(Debug, Clone)]
pub struct NewLink {
    pub short_code: String,
    pub original_url: String,
    pub custom_alias: Option<String>,
    pub owner_id: i64,
    pub expires_at: Option<DateTime<Utc>>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub metadata: LinkMetadata,
}
