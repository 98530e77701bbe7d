//! Resource providers
//!
//! Providers cannot be created or deleted, only listed, shown and registered
//! with the subscription.

use super::RESOURCE_MANAGER_API_VERSION;
use crate::azure::RequestContext;
use crate::error::GatewayError;
use crate::resource::crud::Outcome;
use crate::resource::normalizer::fetch_one;
use crate::resource::{
    parse_linked, subscription_path, trailing_href, ActionKind, AzureResource, Linkable, Parsed,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const NOT_REGISTERED: &str = "NotRegistered";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default, rename = "registrationState")]
    pub registration_state: String,
    #[serde(default, rename = "resourceTypes")]
    pub resource_types: Value,
    #[serde(default, rename = "applicationID", skip_serializing_if = "Option::is_none")]
    pub application_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

impl Linkable for ProviderResponse {
    fn upstream_id(&self) -> &str {
        &self.id
    }

    fn set_href(&mut self, href: String) {
        self.href = Some(href);
    }
}

#[derive(Debug, Clone, Default)]
pub struct Provider {
    namespace: String,
}

impl Provider {
    pub fn named(namespace: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
        }
    }

    fn register_path(&self, subscription: &str) -> String {
        subscription_path(
            subscription,
            &format!("providers/{}/register", urlencoding::encode(&self.namespace)),
            RESOURCE_MANAGER_API_VERSION,
        )
    }
}

impl AzureResource for Provider {
    type Request = ();
    type Response = ProviderResponse;

    fn id(&self) -> &str {
        &self.namespace
    }

    fn build_request_payload(&mut self, _input: &[u8]) -> Result<Self::Request, GatewayError> {
        Err(GatewayError::Decode(
            "providers are registered, not created".to_string(),
        ))
    }

    fn resource_path(&self, subscription: &str) -> String {
        subscription_path(
            subscription,
            &format!("providers/{}", urlencoding::encode(&self.namespace)),
            RESOURCE_MANAGER_API_VERSION,
        )
    }

    fn collection_path(&self, _parent: &str, subscription: &str) -> String {
        subscription_path(subscription, "providers", RESOURCE_MANAGER_API_VERSION)
    }

    fn parse_response(
        &self,
        body: &[u8],
        action: ActionKind,
    ) -> Result<Parsed<Self::Response>, GatewayError> {
        parse_linked(self, body, action)
    }

    fn content_type(&self) -> &'static str {
        "vnd.rightscale.provider+json"
    }

    fn href(&self, upstream_id: &str) -> Result<String, GatewayError> {
        trailing_href(upstream_id, "providers")
    }
}

/// Register a provider with the caller's subscription if it is not yet registered
pub async fn register(
    ctx: &RequestContext,
    provider: Provider,
) -> Result<Outcome<ProviderResponse>, GatewayError> {
    let path = provider.resource_path(ctx.subscription());
    let body = fetch_one(&ctx.client, &path, provider.id()).await?;
    let current = provider.parse_response(&body, ActionKind::Get)?.body;

    if current.registration_state != NOT_REGISTERED {
        return Err(GatewayError::Conflict(format!(
            "Provider {} already registered.",
            provider.namespace
        )));
    }

    tracing::info!("Registering provider {}", provider.namespace);
    let response = ctx.client.post(&provider.register_path(ctx.subscription())).await?;
    if response.is_failure() {
        return Err(GatewayError::upstream("registering provider", &response.body));
    }

    let parsed = provider.parse_response(&response.body, ActionKind::Register)?;
    Ok(Outcome::Rendered {
        body: parsed.body,
        content_type: provider.content_type().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_paths() {
        let provider = Provider::named("Microsoft.Compute");
        assert_eq!(
            provider.resource_path("s"),
            "/subscriptions/s/providers/Microsoft.Compute?api-version=2015-01-01"
        );
        assert_eq!(
            provider.register_path("s"),
            "/subscriptions/s/providers/Microsoft.Compute/register?api-version=2015-01-01"
        );
        assert_eq!(
            provider.collection_path("", "s"),
            "/subscriptions/s/providers?api-version=2015-01-01"
        );
    }

    #[test]
    fn test_parse_sets_href_from_namespace_segment() {
        let provider = Provider::named("Microsoft.Compute");
        let body = json!({
            "id": "/subscriptions/s/providers/Microsoft.Compute",
            "namespace": "Microsoft.Compute",
            "registrationState": "Registered",
            "resourceTypes": []
        })
        .to_string();
        let parsed = provider.parse_response(body.as_bytes(), ActionKind::Register).unwrap();
        assert_eq!(parsed.body.href.as_deref(), Some("providers/Microsoft.Compute"));
        assert_eq!(parsed.body.registration_state, "Registered");
    }

    #[test]
    fn test_create_is_rejected() {
        let mut provider = Provider::named("Microsoft.Compute");
        assert!(provider.build_request_payload(b"{}").is_err());
    }
}
