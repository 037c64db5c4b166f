//! DTOs for `POST /api/url/create` (spec §6, §4.I).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::entities::{Link, LinkMetadata};

/// `{originalUrl, customAlias?, title?, description?}` (spec §6).
///
/// Field-level validation here catches obviously-malformed requests before
/// they reach I; URL normalization and the deeper format checks still
/// happen in [`crate::application::link_authoring`], which is the single
/// place spec §4.I's `INVALID_FORMAT` is raised from.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateLinkRequest {
    #[validate(length(min = 1, message = "originalUrl must not be empty"))]
    pub original_url: String,

    #[validate(length(min = 3, max = 20, message = "customAlias must be 3-20 characters"))]
    pub custom_alias: Option<String>,

    #[validate(length(max = 500))]
    pub title: Option<String>,

    #[validate(length(max = 2000))]
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkMetadataDto {
    pub domain: String,
    pub protocol: String,
    pub path: String,
}

impl From<LinkMetadata> for LinkMetadataDto {
    fn from(m: LinkMetadata) -> Self {
        Self { domain: m.domain, protocol: m.protocol, path: m.path }
    }
}

/// The persisted [`Link`] returned to the caller (spec §3, §6).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkResponse {
    pub id: i64,
    pub short_code: String,
    pub original_url: String,
    pub custom_alias: Option<String>,
    pub owner_id: i64,
    pub click_count: i64,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub is_deleted: bool,
    pub title: Option<String>,
    pub description: Option<String>,
    pub metadata: LinkMetadataDto,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Link> for LinkResponse {
    fn from(link: Link) -> Self {
        Self {
            id: link.id,
            short_code: link.short_code,
            original_url: link.original_url,
            custom_alias: link.custom_alias,
            owner_id: link.owner_id,
            click_count: link.click_count,
            expires_at: link.expires_at,
            is_active: link.is_active,
            is_deleted: link.deleted_at.is_some(),
            title: link.title,
            description: link.description,
            metadata: link.metadata.into(),
            created_at: link.created_at,
            updated_at: link.updated_at,
        }
    }
}
