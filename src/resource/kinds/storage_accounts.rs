//! Storage accounts (`Microsoft.Storage/storageAccounts`)
//!
//! Creation is almost always asynchronous upstream: expect a 202 with an
//! operation id, polled through the `storage` service kind.

use crate::error::GatewayError;
use crate::resource::{
    decode_input, group_resource_path, group_scoped_href, parse_linked, require,
    scoped_collection_path, ActionKind, AzureResource, Parsed, TrackedResource,
};
use serde::{Deserialize, Serialize};

const STORAGE_ACCOUNT_PATH: &str = "providers/Microsoft.Storage/storageAccounts";
const STORAGE_API_VERSION: &str = "2015-06-15";
const DEFAULT_ACCOUNT_TYPE: &str = "Standard_LRS";

#[derive(Debug, Default, Deserialize)]
struct CreateParams {
    #[serde(default)]
    name: String,
    #[serde(default)]
    location: String,
    #[serde(default)]
    group_name: String,
    #[serde(default)]
    account_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageAccountProperties {
    pub account_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorageAccountRequest {
    pub location: String,
    pub properties: StorageAccountProperties,
}

#[derive(Debug, Clone, Default)]
pub struct StorageAccount {
    group: String,
    name: String,
}

impl StorageAccount {
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

impl AzureResource for StorageAccount {
    type Request = StorageAccountRequest;
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

        Ok(StorageAccountRequest {
            location: params.location,
            properties: StorageAccountProperties {
                account_type: params
                    .account_type
                    .filter(|t| !t.is_empty())
                    .unwrap_or_else(|| DEFAULT_ACCOUNT_TYPE.to_string()),
            },
        })
    }

    fn resource_path(&self, subscription: &str) -> String {
        group_resource_path(
            subscription,
            &self.group,
            STORAGE_ACCOUNT_PATH,
            &self.name,
            STORAGE_API_VERSION,
        )
    }

    fn collection_path(&self, parent: &str, subscription: &str) -> String {
        scoped_collection_path(subscription, parent, STORAGE_ACCOUNT_PATH, STORAGE_API_VERSION)
    }

    fn parse_response(
        &self,
        body: &[u8],
        action: ActionKind,
    ) -> Result<Parsed<Self::Response>, GatewayError> {
        parse_linked(self, body, action)
    }

    fn content_type(&self) -> &'static str {
        "vnd.rightscale.storage_account+json"
    }

    fn href(&self, upstream_id: &str) -> Result<String, GatewayError> {
        group_scoped_href(upstream_id, "storage_accounts")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_account_type() {
        let mut account = StorageAccount::in_group("data");
        let request = account
            .build_request_payload(br#"{"name":"logs01","location":"eastus"}"#)
            .unwrap();
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"location":"eastus","properties":{"accountType":"Standard_LRS"}})
        );
    }

    #[test]
    fn test_group_from_body_when_route_has_none() {
        let mut account = StorageAccount::default();
        account
            .build_request_payload(
                br#"{"name":"logs01","location":"eastus","group_name":"data","account_type":"Premium_LRS"}"#,
            )
            .unwrap();
        assert_eq!(
            account.resource_path("s"),
            "/subscriptions/s/resourceGroups/data/providers/Microsoft.Storage/storageAccounts/logs01?api-version=2015-06-15"
        );
    }

    #[test]
    fn test_missing_group_rejected() {
        let mut account = StorageAccount::default();
        assert!(account
            .build_request_payload(br#"{"name":"logs01","location":"eastus"}"#)
            .is_err());
    }

    #[test]
    fn test_collection_content_type() {
        assert_eq!(
            StorageAccount::default().collection_content_type(),
            "vnd.rightscale.storage_account+json;type=collection"
        );
    }
}
