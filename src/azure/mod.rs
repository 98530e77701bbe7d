//! Azure API interaction module
//!
//! # Module Structure
//!
//! - [`auth`] - Per-request credentials from cookies and token acquisition
//! - [`client`] - Per-request client and the [`RequestContext`] handed to the core
//! - [`http`] - Raw HTTP transport that preserves status, `Location` and body

pub mod auth;
pub mod client;
pub mod http;

pub use auth::{CredentialSecret, Credentials};
pub use client::{AzureClient, RequestContext};
pub use http::{AzureHttpClient, UpstreamResponse};
