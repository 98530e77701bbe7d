//! Azure Client
//!
//! Per-request client combining the caller's credentials with the shared HTTP
//! transport. Resource paths are built relative to the subscription root and
//! resolved against the configured base URL here.

use super::auth::Credentials;
use super::http::{AzureHttpClient, UpstreamResponse};
use crate::error::GatewayError;
use serde::Serialize;
use std::sync::Arc;

/// Client used by the core for one inbound request
#[derive(Clone)]
pub struct AzureClient {
    http: AzureHttpClient,
    base_url: Arc<str>,
}

impl AzureClient {
    pub fn new(http: AzureHttpClient, base_url: &str) -> Self {
        Self {
            http,
            base_url: Arc::from(base_url.trim_end_matches('/')),
        }
    }

    /// Resolve a relative path (or pass an absolute `nextLink` through)
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}{}", self.base_url, path)
        }
    }

    /// Whether `link` resolves to the configured upstream (scheme, host and port)
    pub fn is_upstream(&self, link: &str) -> bool {
        let (Ok(base), Ok(target)) = (url::Url::parse(&self.base_url), url::Url::parse(&self.url(link)))
        else {
            return false;
        };
        base.scheme() == target.scheme()
            && base.host_str() == target.host_str()
            && base.port_or_known_default() == target.port_or_known_default()
    }

    pub async fn get(&self, path: &str) -> Result<UpstreamResponse, GatewayError> {
        self.http.get(&self.url(path)).await
    }

    pub async fn put_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<UpstreamResponse, GatewayError> {
        self.http.put_json(&self.url(path), body).await
    }

    pub async fn post(&self, path: &str) -> Result<UpstreamResponse, GatewayError> {
        self.http.post(&self.url(path)).await
    }

    pub async fn delete(&self, path: &str) -> Result<UpstreamResponse, GatewayError> {
        self.http.delete(&self.url(path)).await
    }
}

/// Everything the core needs from the authentication middleware
#[derive(Clone)]
pub struct RequestContext {
    pub credentials: Arc<Credentials>,
    pub client: AzureClient,
}

impl RequestContext {
    pub fn subscription(&self) -> &str {
        &self.credentials.subscription_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> AzureClient {
        let http = AzureHttpClient::new(reqwest::Client::new(), "t".to_string(), "application/json");
        AzureClient::new(http, "https://management.azure.com/")
    }

    #[test]
    fn test_relative_path_resolved_against_base() {
        assert_eq!(
            client().url("/subscriptions/s/providers?api-version=1"),
            "https://management.azure.com/subscriptions/s/providers?api-version=1"
        );
    }

    #[test]
    fn test_upstream_links() {
        let client = client();
        assert!(client.is_upstream("/subscriptions/s/providers"));
        assert!(client.is_upstream("https://management.azure.com/subscriptions/s?$skiptoken=x"));
        assert!(client.is_upstream("https://management.azure.com:443/subscriptions/s"));
        assert!(!client.is_upstream("https://evil.example.com/subscriptions/s"));
        assert!(!client.is_upstream("http://management.azure.com/subscriptions/s"));
        assert!(!client.is_upstream("https://management.azure.com:8443/subscriptions/s"));
    }

    #[test]
    fn test_absolute_next_link_passed_through() {
        let link = "https://management.azure.com/subscriptions/s/providers?$skiptoken=x";
        assert_eq!(client().url(link), link);
    }
}
