//! Click store trait (spec §4.D).

use async_trait::async_trait;

use crate::domain::entities::ClickEvent;
use crate::error::AppError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClickStore: Send + Sync {
    /// Unconditionally appends an event. Callers treat failures as
    /// best-effort: per spec §4.D and §7, click tracking never propagates
    /// a store failure back to the request handler.
    async fn insert(&self, event: ClickEvent) -> Result<(), AppError>;
}
