//! PostgreSQL implementation of the link store (spec §4.C).

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{Link, LinkMetadata, LinkProjection, NewLink};
use crate::domain::repositories::{InsertOutcome, LinkStore};
use crate::error::AppError;

pub struct PgLinkStore {
    pool: Arc<PgPool>,
}

impl PgLinkStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

struct LinkRow {
    id: i64,
    short_code: String,
    original_url: String,
    custom_alias: Option<String>,
    owner_id: i64,
    click_count: i64,
    expires_at: Option<chrono::DateTime<chrono::Utc>>,
    is_active: bool,
    deleted_at: Option<chrono::DateTime<chrono::Utc>>,
    title: Option<String>,
    description: Option<String>,
    meta_domain: String,
    meta_protocol: String,
    meta_path: String,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<LinkRow> for Link {
    fn from(r: LinkRow) -> Self {
        Link {
            id: r.id,
            short_code: r.short_code,
            original_url: r.original_url,
            custom_alias: r.custom_alias,
            owner_id: r.owner_id,
            click_count: r.click_count,
            expires_at: r.expires_at,
            is_active: r.is_active,
            deleted_at: r.deleted_at,
            title: r.title,
            description: r.description,
            metadata: LinkMetadata {
                domain: r.meta_domain,
                protocol: r.meta_protocol,
                path: r.meta_path,
            },
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[async_trait]
impl LinkStore for PgLinkStore {
    /// Queries on `(shortCode, isDeleted=false)`, projects only the four
    /// hot-path fields from the row, then applies the §4.C post-filter:
    /// inactive and expired links surface as distinct error kinds instead of
    /// silently failing the lookup.
    async fn find_by_short_code(&self, code: &str) -> Result<LinkProjection, AppError> {
        let row = sqlx::query!(
            r#"
            SELECT original_url, is_active, owner_id, expires_at
            FROM links
            WHERE short_code = $1 AND deleted_at IS NULL
            "#,
            code
        )
        .fetch_optional(self.pool.as_ref())
        .await?
        .ok_or_else(|| {
            AppError::url_not_found("Short URL not found").with_context("shortCode", code)
        })?;

        if !row.is_active {
            return Err(AppError::url_inactive("This link has been deactivated")
                .with_context("shortCode", code));
        }

        if row.expires_at.is_some_and(|e| e <= chrono::Utc::now()) {
            return Err(
                AppError::url_expired("This link has expired").with_context("shortCode", code)
            );
        }

        Ok(LinkProjection {
            original_url: row.original_url,
            is_active: row.is_active,
            owner_id: row.owner_id,
            expires_at: row.expires_at,
        })
    }

    async fn increment_click_count(&self, code: &str) -> Result<(), AppError> {
        let result = sqlx::query!(
            r#"
            UPDATE links SET click_count = click_count + 1, updated_at = now()
            WHERE short_code = $1 AND deleted_at IS NULL
            "#,
            code
        )
        .execute(self.pool.as_ref())
        .await?;

        if result.rows_affected() == 0 {
            return Err(
                AppError::url_not_found("Short URL not found").with_context("shortCode", code)
            );
        }
        Ok(())
    }

    async fn exists(&self, code: &str) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar!(
            r#"SELECT EXISTS(SELECT 1 FROM links WHERE short_code = $1 AND deleted_at IS NULL) AS "exists!""#,
            code
        )
        .fetch_one(self.pool.as_ref())
        .await?;
        Ok(exists)
    }

    async fn insert(&self, new_link: NewLink) -> Result<InsertOutcome, AppError> {
        let result = sqlx::query_as!(
            LinkRow,
            r#"
            INSERT INTO links (
                short_code, original_url, custom_alias, owner_id, expires_at,
                title, description, meta_domain, meta_protocol, meta_path
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING
                id, short_code, original_url, custom_alias, owner_id, click_count,
                expires_at, is_active, deleted_at, title, description,
                meta_domain, meta_protocol, meta_path, created_at, updated_at
            "#,
            new_link.short_code,
            new_link.original_url,
            new_link.custom_alias,
            new_link.owner_id,
            new_link.expires_at,
            new_link.title,
            new_link.description,
            new_link.metadata.domain,
            new_link.metadata.protocol,
            new_link.metadata.path,
        )
        .fetch_one(self.pool.as_ref())
        .await;

        match result {
            Ok(row) => Ok(InsertOutcome::Inserted(row.into())),
            Err(sqlx::Error::Database(ref db_err)) if db_err.is_unique_violation() => {
                Ok(InsertOutcome::DuplicateKey)
            }
            Err(e) => Err(e.into()),
        }
    }
}
