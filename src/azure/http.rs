//! HTTP utilities for Azure REST API calls
//!
//! Unlike a typical client wrapper, nothing here interprets status codes: the
//! CRUD orchestrator and the operation bridge need the raw status, the
//! `Location` header and the body to decide what the caller sees.

use crate::error::{sanitize_for_log, GatewayError};
use reqwest::header::{ACCEPT, CONTENT_TYPE, LOCATION};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Serialize;

/// Raw upstream answer
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    /// `Location` header, if the provider set one
    pub location: Option<String>,
    pub body: Vec<u8>,
}

impl UpstreamResponse {
    /// Upstream signalled failure (>= 400)
    pub fn is_failure(&self) -> bool {
        self.status.as_u16() >= 400
    }
}

/// Build the shared outbound client
///
/// The client is cheap to clone and safe for concurrent use; one instance
/// serves every request.
pub fn build_client(user_agent: &str) -> Result<Client, reqwest::Error> {
    Client::builder().user_agent(user_agent).build()
}

/// HTTP client bound to one caller's bearer token
#[derive(Clone)]
pub struct AzureHttpClient {
    client: Client,
    token: String,
    media_type: String,
}

impl AzureHttpClient {
    pub fn new(client: Client, token: String, media_type: &str) -> Self {
        Self {
            client,
            token,
            media_type: media_type.to_string(),
        }
    }

    /// GET a URL
    pub async fn get(&self, url: &str) -> Result<UpstreamResponse, GatewayError> {
        tracing::debug!("GET {}", url);
        self.send(self.client.get(url)).await
    }

    /// PUT a JSON body
    pub async fn put_json<T: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &T,
    ) -> Result<UpstreamResponse, GatewayError> {
        tracing::debug!("PUT {}", url);
        let payload = serde_json::to_vec(body)
            .map_err(|e| GatewayError::Decode(format!("failed to encode payload: {}", e)))?;
        let request = self
            .client
            .put(url)
            .header(CONTENT_TYPE, &self.media_type)
            .body(payload);
        self.send(request).await
    }

    /// POST without a body
    pub async fn post(&self, url: &str) -> Result<UpstreamResponse, GatewayError> {
        tracing::debug!("POST {}", url);
        let request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, &self.media_type)
            .body(Vec::new());
        self.send(request).await
    }

    /// DELETE a URL
    pub async fn delete(&self, url: &str) -> Result<UpstreamResponse, GatewayError> {
        tracing::debug!("DELETE {}", url);
        self.send(self.client.delete(url)).await
    }

    async fn send(&self, request: RequestBuilder) -> Result<UpstreamResponse, GatewayError> {
        let response = request
            .bearer_auth(&self.token)
            .header(ACCEPT, &self.media_type)
            .send()
            .await?;

        let status = response.status();
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_string);
        let body = response.bytes().await?.to_vec();

        if status.as_u16() >= 400 {
            // Security: only log sanitized/truncated error body
            tracing::warn!(
                "API error: {} - {}",
                status,
                sanitize_for_log(&String::from_utf8_lossy(&body))
            );
        }

        Ok(UpstreamResponse {
            status,
            location,
            body,
        })
    }
}
