//! azgate - stateless HTTP gateway over Azure Resource Manager
//!
//! Callers speak a uniform resource model (`/resource_groups/{g}/availability_sets`,
//! ...); the gateway translates each request into the matching ARM call,
//! normalizes the provider's response envelope, injects caller-facing hrefs and
//! bridges ARM long-running operations into a pollable route.
//!
//! # Module Structure
//!
//! - [`azure`] - Credentials, token acquisition and the upstream HTTP client
//! - [`resource`] - Resource capability trait, kinds, normalizer and CRUD
//! - [`operation`] - 202 + `Location` bridge and operation polling
//! - [`server`] - axum router, middleware and handlers
//! - [`config`] - Immutable process configuration
//! - [`error`] - Error taxonomy and its HTTP rendering

pub mod azure;
pub mod config;
pub mod error;
pub mod operation;
pub mod resource;
pub mod server;

pub use config::Config;
pub use error::GatewayError;
pub use server::{build_router, AppState};

/// Version injected at compile time via AZGATE_VERSION env var (set by CI/CD),
/// or "dev" for local builds.
pub const VERSION: &str = match option_env!("AZGATE_VERSION") {
    Some(v) => v,
    None => "dev",
};
