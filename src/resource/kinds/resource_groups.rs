//! Resource groups
//!
//! Groups have no parent scope, so the collection is always subscription-wide.

use super::RESOURCE_MANAGER_API_VERSION;
use crate::error::GatewayError;
use crate::resource::{
    decode_input, parse_linked, require, subscription_path, trailing_href, ActionKind,
    AzureResource, Parsed, TrackedResource,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Default, Deserialize)]
struct CreateParams {
    #[serde(default)]
    name: String,
    #[serde(default)]
    location: String,
    #[serde(default)]
    tags: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceGroupRequest {
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Value>,
}

#[derive(Debug, Clone, Default)]
pub struct ResourceGroup {
    name: String,
}

impl ResourceGroup {
    pub fn locate(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

impl AzureResource for ResourceGroup {
    type Request = ResourceGroupRequest;
    type Response = TrackedResource;

    fn id(&self) -> &str {
        &self.name
    }

    fn build_request_payload(&mut self, input: &[u8]) -> Result<Self::Request, GatewayError> {
        let params: CreateParams = decode_input(input)?;
        self.name = require("name", &params.name)?.to_string();
        require("location", &params.location)?;

        Ok(ResourceGroupRequest {
            location: params.location,
            tags: params.tags.filter(|t| !t.is_null()),
        })
    }

    fn resource_path(&self, subscription: &str) -> String {
        subscription_path(
            subscription,
            &format!("resourcegroups/{}", urlencoding::encode(&self.name)),
            RESOURCE_MANAGER_API_VERSION,
        )
    }

    fn collection_path(&self, _parent: &str, subscription: &str) -> String {
        subscription_path(subscription, "resourcegroups", RESOURCE_MANAGER_API_VERSION)
    }

    fn parse_response(
        &self,
        body: &[u8],
        action: ActionKind,
    ) -> Result<Parsed<Self::Response>, GatewayError> {
        parse_linked(self, body, action)
    }

    fn content_type(&self) -> &'static str {
        "vnd.rightscale.resource_group+json"
    }

    fn href(&self, upstream_id: &str) -> Result<String, GatewayError> {
        trailing_href(upstream_id, "resource_groups")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        let group = ResourceGroup::locate("web");
        assert_eq!(
            group.resource_path("s"),
            "/subscriptions/s/resourcegroups/web?api-version=2015-01-01"
        );
        assert_eq!(
            group.collection_path("ignored", "s"),
            "/subscriptions/s/resourcegroups?api-version=2015-01-01"
        );
    }

    #[test]
    fn test_payload() {
        let mut group = ResourceGroup::default();
        let request = group
            .build_request_payload(br#"{"name":"web","location":"westus","tags":{"env":"dev"}}"#)
            .unwrap();
        assert_eq!(request.location, "westus");
        assert_eq!(group.id(), "web");
    }

    #[test]
    fn test_href() {
        assert_eq!(
            ResourceGroup::default().href("/subscriptions/s/resourceGroups/web").unwrap(),
            "resource_groups/web"
        );
    }
}
