//! Network interfaces (`Microsoft.Network/networkInterfaces`)

use crate::error::GatewayError;
use crate::resource::{
    decode_input, group_resource_path, group_scoped_href, parse_linked, require,
    scoped_collection_path, ActionKind, AzureResource, Parsed, TrackedResource,
};
use serde::{Deserialize, Serialize};

const NETWORK_INTERFACE_PATH: &str = "providers/Microsoft.Network/networkInterfaces";
const NETWORK_API_VERSION: &str = "2015-06-15";

#[derive(Debug, Default, Deserialize)]
struct CreateParams {
    #[serde(default)]
    name: String,
    #[serde(default)]
    location: String,
    #[serde(default)]
    group_name: String,
    #[serde(default)]
    subnet_id: String,
    #[serde(default)]
    ip_address_id: Option<String>,
    #[serde(default)]
    network_security_group_id: Option<String>,
    #[serde(default)]
    private_ip_address: Option<String>,
}

/// `{"id": ...}` reference to another ARM resource
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubResource {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IpConfigurationProperties {
    pub subnet: SubResource,
    #[serde(rename = "privateIPAllocationMethod")]
    pub private_ip_allocation_method: String,
    #[serde(rename = "privateIPAddress", skip_serializing_if = "Option::is_none")]
    pub private_ip_address: Option<String>,
    #[serde(rename = "publicIPAddress", skip_serializing_if = "Option::is_none")]
    pub public_ip_address: Option<SubResource>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IpConfiguration {
    pub name: String,
    pub properties: IpConfigurationProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInterfaceProperties {
    pub ip_configurations: Vec<IpConfiguration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_security_group: Option<SubResource>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkInterfaceRequest {
    pub location: String,
    pub properties: NetworkInterfaceProperties,
}

#[derive(Debug, Clone, Default)]
pub struct NetworkInterface {
    group: String,
    name: String,
}

impl NetworkInterface {
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

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl AzureResource for NetworkInterface {
    type Request = NetworkInterfaceRequest;
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
        require("subnet_id", &params.subnet_id)?;

        let private_ip_address = non_empty(params.private_ip_address);
        let allocation = if private_ip_address.is_some() {
            "Static"
        } else {
            "Dynamic"
        };

        let ip_configuration = IpConfiguration {
            name: format!("{}-ipconfig", self.name),
            properties: IpConfigurationProperties {
                subnet: SubResource {
                    id: params.subnet_id,
                },
                private_ip_allocation_method: allocation.to_string(),
                private_ip_address,
                public_ip_address: non_empty(params.ip_address_id).map(|id| SubResource { id }),
            },
        };

        Ok(NetworkInterfaceRequest {
            location: params.location,
            properties: NetworkInterfaceProperties {
                ip_configurations: vec![ip_configuration],
                network_security_group: non_empty(params.network_security_group_id)
                    .map(|id| SubResource { id }),
            },
        })
    }

    fn resource_path(&self, subscription: &str) -> String {
        group_resource_path(
            subscription,
            &self.group,
            NETWORK_INTERFACE_PATH,
            &self.name,
            NETWORK_API_VERSION,
        )
    }

    fn collection_path(&self, parent: &str, subscription: &str) -> String {
        scoped_collection_path(subscription, parent, NETWORK_INTERFACE_PATH, NETWORK_API_VERSION)
    }

    fn parse_response(
        &self,
        body: &[u8],
        action: ActionKind,
    ) -> Result<Parsed<Self::Response>, GatewayError> {
        parse_linked(self, body, action)
    }

    fn content_type(&self) -> &'static str {
        "vnd.rightscale.network_interface+json"
    }

    fn href(&self, upstream_id: &str) -> Result<String, GatewayError> {
        group_scoped_href(upstream_id, "network_interfaces")
    }
}
