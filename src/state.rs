//! Per-binary application state (spec §11): the authoring service and the
//! redirect service compose different subsets of the core's components over
//! the same `PgPool`-backed stores.

use std::sync::Arc;

use crate::application::allocator::ShortCodeAllocator;
use crate::application::click_ingestor::ClickIngestor;
use crate::application::dashboard_service::DashboardService;
use crate::application::link_authoring::LinkAuthoringService;
use crate::application::redirect_resolver::RedirectResolver;
use crate::application::token_verifier::TokenVerifier;
use crate::infrastructure::persistence::{PgClickStore, PgLinkStore};

/// Implemented by both service states so the auth middleware (spec §4.O) is
/// written once and layered on either router.
pub trait HasTokenVerifier {
    fn token_verifier(&self) -> &TokenVerifier;
}

/// State for `src/bin/authoring_service.rs`: link creation and collision
/// metrics only. No cache/resolver/ingestor -- those belong to the redirect
/// service (spec §11).
#[derive(Clone)]
pub struct AuthoringState {
    pub link_authoring: Arc<LinkAuthoringService<PgLinkStore>>,
    pub allocator: Arc<ShortCodeAllocator<PgLinkStore>>,
    pub token_verifier: Arc<TokenVerifier>,
}

impl HasTokenVerifier for AuthoringState {
    fn token_verifier(&self) -> &TokenVerifier {
        &self.token_verifier
    }
}

/// State for `src/bin/redirect_service.rs`: the hot redirect path, click
/// ingestion, and the dashboard (spec §11).
#[derive(Clone)]
pub struct RedirectState {
    pub redirect_resolver: Arc<RedirectResolver<PgLinkStore>>,
    pub click_ingestor: Arc<ClickIngestor<PgLinkStore, PgClickStore>>,
    pub dashboard_service: Arc<DashboardService>,
    pub token_verifier: Arc<TokenVerifier>,
}

impl HasTokenVerifier for RedirectState {
    fn token_verifier(&self) -> &TokenVerifier {
        &self.token_verifier
    }
}
