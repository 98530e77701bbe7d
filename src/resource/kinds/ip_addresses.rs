//! Public IP addresses (`Microsoft.Network/publicIPAddresses`)

use crate::error::GatewayError;
use crate::resource::{
    decode_input, group_resource_path, group_scoped_href, parse_linked, require,
    scoped_collection_path, ActionKind, AzureResource, Parsed, TrackedResource,
};
use serde::{Deserialize, Serialize};

const IP_ADDRESS_PATH: &str = "providers/Microsoft.Network/publicIPAddresses";
const NETWORK_API_VERSION: &str = "2015-06-15";

#[derive(Debug, Default, Deserialize)]
struct CreateParams {
    #[serde(default)]
    name: String,
    #[serde(default)]
    location: String,
    #[serde(default)]
    group_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IpAddressProperties {
    #[serde(rename = "publicIPAllocationMethod")]
    pub public_ip_allocation_method: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IpAddressRequest {
    pub location: String,
    pub properties: IpAddressProperties,
}

#[derive(Debug, Clone, Default)]
pub struct IpAddress {
    group: String,
    name: String,
}

impl IpAddress {
    pub fn locate(group: &str, name: &str) -> Self {
        Self {
            group: group.to_string(),
            name: name.to_string(),
        }
    }

    pub fn in_group(group: &str) -> Self {
        Self::locate(group, "")
    }
}

impl AzureResource for IpAddress {
    type Request = IpAddressRequest;
    type Response = TrackedResource;

    fn id(&self) -> &str {
        &self.name
    }

    // Addresses are always allocated dynamically
    fn build_request_payload(&mut self, input: &[u8]) -> Result<Self::Request, GatewayError> {
        let params: CreateParams = decode_input(input)?;
        if self.group.is_empty() {
            self.group = params.group_name.clone();
        }
        require("group_name", &self.group)?;
        self.name = require("name", &params.name)?.to_string();
        require("location", &params.location)?;

        Ok(IpAddressRequest {
            location: params.location,
            properties: IpAddressProperties {
                public_ip_allocation_method: "Dynamic".to_string(),
            },
        })
    }

    fn resource_path(&self, subscription: &str) -> String {
        group_resource_path(
            subscription,
            &self.group,
            IP_ADDRESS_PATH,
            &self.name,
            NETWORK_API_VERSION,
        )
    }

    fn collection_path(&self, parent: &str, subscription: &str) -> String {
        scoped_collection_path(subscription, parent, IP_ADDRESS_PATH, NETWORK_API_VERSION)
    }

    fn parse_response(
        &self,
        body: &[u8],
        action: ActionKind,
    ) -> Result<Parsed<Self::Response>, GatewayError> {
        parse_linked(self, body, action)
    }

    fn content_type(&self) -> &'static str {
        "vnd.rightscale.ip_address+json"
    }

    fn href(&self, upstream_id: &str) -> Result<String, GatewayError> {
        group_scoped_href(upstream_id, "ip_addresses")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_payload_is_dynamic() {
        let mut address = IpAddress::in_group("net");
        let request = address
            .build_request_payload(br#"{"name":"front-ip","location":"westus"}"#)
            .unwrap();
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"location":"westus","properties":{"publicIPAllocationMethod":"Dynamic"}})
        );
        assert_eq!(
            address.resource_path("s"),
            "/subscriptions/s/resourceGroups/net/providers/Microsoft.Network/publicIPAddresses/front-ip?api-version=2015-06-15"
        );
    }

    #[test]
    fn test_missing_location_rejected() {
        let mut address = IpAddress::in_group("net");
        assert!(matches!(
            address.build_request_payload(br#"{"name":"front-ip"}"#),
            Err(GatewayError::Decode(_))
        ));
    }

    #[test]
    fn test_href() {
        let address = IpAddress::default();
        assert_eq!(
            address
                .href("/subscriptions/s/resourceGroups/net/providers/Microsoft.Network/publicIPAddresses/front-ip")
                .unwrap(),
            "resource_groups/net/ip_addresses/front-ip"
        );
    }

    #[test]
    fn test_collection_paths() {
        let address = IpAddress::default();
        assert_eq!(
            address.collection_path("", "s"),
            "/subscriptions/s/providers/Microsoft.Network/publicIPAddresses?api-version=2015-06-15"
        );
        assert_eq!(
            address.collection_content_type(),
            "vnd.rightscale.ip_address+json;type=collection"
        );
    }
}
