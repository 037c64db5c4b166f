//! Link authoring service (spec §4.I): normalize, reserve a code, compose,
//! persist.

use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::application::allocator::ShortCodeAllocator;
use crate::domain::entities::{Link, LinkMetadata, NewLink};
use crate::domain::repositories::LinkStore;
use crate::error::AppError;
use crate::utils::ua_parser::extract_domain;
use crate::utils::url_normalizer::normalize_url;

/// Caller-supplied input to [`LinkAuthoringService::create`].
#[derive(Debug, Clone)]
pub struct CreateLinkInput {
    pub original_url: String,
    pub custom_alias: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
}

pub struct LinkAuthoringService<S: LinkStore> {
    allocator: Arc<ShortCodeAllocator<S>>,
    default_ttl_days: i64,
}

impl<S: LinkStore> LinkAuthoringService<S> {
    pub fn new(allocator: Arc<ShortCodeAllocator<S>>, default_ttl_days: i64) -> Self {
        Self { allocator, default_ttl_days }
    }

    /// Creates and persists a new [`Link`] (spec §4.I).
    pub async fn create(&self, input: CreateLinkInput, owner_id: i64) -> Result<Link, AppError> {
        let normalized_url = normalize_url(&input.original_url)
            .map_err(|e| AppError::invalid_format("Invalid URL format").wrap(e))?;

        let metadata = parse_metadata(&normalized_url)?;

        let template = NewLink {
            short_code: String::new(),
            original_url: normalized_url,
            custom_alias: None,
            owner_id,
            expires_at: Some(Utc::now() + Duration::days(self.default_ttl_days)),
            title: input.title,
            description: input.description,
            metadata,
        };

        match input.custom_alias {
            Some(alias) => self.allocator.allocate_custom_alias(&alias, template).await,
            None => self.allocator.allocate(template).await,
        }
    }
}

/// Derives `LinkMetadata.{domain,protocol,path}` from an already-normalized
/// URL (spec §4.I step 3).
fn parse_metadata(normalized_url: &str) -> Result<LinkMetadata, AppError> {
    let parsed = url::Url::parse(normalized_url)
        .map_err(|e| AppError::invalid_format("Invalid URL format").wrap(e))?;

    Ok(LinkMetadata {
        domain: extract_domain(normalized_url),
        protocol: parsed.scheme().to_string(),
        path: parsed.path().to_string(),
    })
}
