//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer, providing
//! concrete implementations for data persistence, caching, and the external
//! collaborators named in spec §6.
//!
//! # Modules
//!
//! - [`cache`] - Cache driver + key namer (spec §4.A, §4.B)
//! - [`persistence`] - PostgreSQL link/click stores (spec §4.C, §4.D)
//! - [`geoip`] - Geo-IP resolver (spec §4.E)
//! - [`rpc_client`] - Message-broker RPC client (spec §4.G)

pub mod cache;
pub mod geoip;
pub mod persistence;
pub mod rpc_client;
