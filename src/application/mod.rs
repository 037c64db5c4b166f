//! Application layer: the core's use-cases, composed over domain traits and
//! infrastructure adapters.
//!
//! - [`allocator`] - Short-code allocator (spec §4.H)
//! - [`link_authoring`] - Link authoring service (spec §4.I)
//! - [`redirect_resolver`] - Redirect resolver (spec §4.J)
//! - [`click_ingestor`] - Click ingestor (spec §4.K)
//! - [`dashboard_service`] - Dashboard service (spec §4.L)
//! - [`token_verifier`] - Token verifier (spec §4.M)

pub mod allocator;
pub mod click_ingestor;
pub mod dashboard_service;
pub mod link_authoring;
pub mod redirect_resolver;
pub mod token_verifier;
