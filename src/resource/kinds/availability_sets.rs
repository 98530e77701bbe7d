//! Availability sets (`Microsoft.Compute/availabilitySets`)

use super::COMPUTE_API_VERSION;
use crate::error::GatewayError;
use crate::resource::{
    decode_input, group_resource_path, group_scoped_href, parse_linked, require,
    scoped_collection_path, ActionKind, AzureResource, Parsed, TrackedResource,
};
use serde::{Deserialize, Serialize};

const AVAILABILITY_SET_PATH: &str = "providers/Microsoft.Compute/availabilitySets";

#[derive(Debug, Default, Deserialize)]
struct CreateParams {
    #[serde(default)]
    name: String,
    #[serde(default)]
    location: String,
    #[serde(default)]
    group_name: String,
    #[serde(default)]
    platform_fault_domain_count: Option<u32>,
    #[serde(default)]
    platform_update_domain_count: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilitySetProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform_fault_domain_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform_update_domain_count: Option<u32>,
}

/// Body sent upstream on create
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AvailabilitySetRequest {
    pub name: String,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<AvailabilitySetProperties>,
}

#[derive(Debug, Clone, Default)]
pub struct AvailabilitySet {
    group: String,
    name: String,
}

impl AvailabilitySet {
    /// An existing set addressed by route parameters
    pub fn locate(group: &str, name: &str) -> Self {
        Self {
            group: group.to_string(),
            name: name.to_string(),
        }
    }

    /// A set about to be created inside `group`
    pub fn in_group(group: &str) -> Self {
        Self::locate(group, "")
    }
}

impl AzureResource for AvailabilitySet {
    type Request = AvailabilitySetRequest;
    type Response = TrackedResource;

    fn id(&self) -> &str {
        &self.name
    }

    fn build_request_payload(&mut self, input: &[u8]) -> Result<Self::Request, GatewayError> {
        let params: CreateParams = decode_input(input)?;
        if self.group.is_empty() {
            self.group = params.group_name.clone();
        }
        require("group_name", &self.group)?;
        self.name = require("name", &params.name)?.to_string();
        require("location", &params.location)?;

        let properties = match (
            params.platform_fault_domain_count,
            params.platform_update_domain_count,
        ) {
            (None, None) => None,
            (fault, update) => Some(AvailabilitySetProperties {
                platform_fault_domain_count: fault,
                platform_update_domain_count: update,
            }),
        };

        Ok(AvailabilitySetRequest {
            name: params.name,
            location: params.location,
            properties,
        })
    }

    fn resource_path(&self, subscription: &str) -> String {
        group_resource_path(
            subscription,
            &self.group,
            AVAILABILITY_SET_PATH,
            &self.name,
            COMPUTE_API_VERSION,
        )
    }

    fn collection_path(&self, parent: &str, subscription: &str) -> String {
        scoped_collection_path(subscription, parent, AVAILABILITY_SET_PATH, COMPUTE_API_VERSION)
    }

    fn parse_response(
        &self,
        body: &[u8],
        action: ActionKind,
    ) -> Result<Parsed<Self::Response>, GatewayError> {
        parse_linked(self, body, action)
    }

    fn content_type(&self) -> &'static str {
        "vnd.rightscale.availability_set+json"
    }

    fn href(&self, upstream_id: &str) -> Result<String, GatewayError> {
        group_scoped_href(upstream_id, "availability_sets")
    }
}
