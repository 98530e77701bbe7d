//! Resource abstraction layer
//!
//! Every resource kind exposed by the gateway implements [`AzureResource`] and
//! is driven through the generic orchestrator in [`crud`]. A kind only knows
//! how to build its paths, its upstream payload, how to read the provider's
//! answer back, and how to turn a provider id into a caller-facing href.
//!
//! # Architecture
//!
//! - [`kinds`] - Concrete resource kinds (availability sets, providers, ...)
//! - [`normalizer`] - Decodes upstream bodies across envelope shapes
//! - [`crud`] - Generic Create/Get/List/Delete
//! - [`catalog`] - Read-only listings forwarded as generic records
//!
//! # Example
//!
//! ```ignore
//! use azgate::resource::{crud, kinds::AvailabilitySet};
//!
//! async fn show(ctx: &RequestContext) -> Result<(), GatewayError> {
//!     let set = AvailabilitySet::locate("my-group", "web-tier");
//!     let outcome = crud::get(ctx, set).await?;
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod crud;
pub mod kinds;
pub mod normalizer;

use crate::error::GatewayError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Open key/value record for kinds forwarded without a dedicated model
pub type GenericRecord = Map<String, Value>;

/// Suffix appended to a kind's media type for list responses
pub const COLLECTION_SUFFIX: &str = ";type=collection";

/// Which action produced the upstream body handed to `parse_response`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Create,
    Get,
    Register,
}

/// Decoded upstream response plus the `Location` header to send back, if any
#[derive(Debug, Clone)]
pub struct Parsed<T> {
    pub body: T,
    pub location: Option<String>,
}

/// Capability contract every resource kind satisfies
pub trait AzureResource {
    /// Payload actually sent upstream
    type Request: Serialize + Send + Sync;
    /// Payload parsed back from upstream
    type Response: Serialize + Send;

    /// Caller-visible identifier used in not-found errors
    fn id(&self) -> &str;

    /// Decode caller input, merge route parameters, produce the upstream payload
    fn build_request_payload(&mut self, input: &[u8]) -> Result<Self::Request, GatewayError>;

    /// Single-resource path relative to the upstream base URL
    fn resource_path(&self, subscription: &str) -> String;

    /// Collection path; an empty `parent` selects the subscription-wide collection
    fn collection_path(&self, parent: &str, subscription: &str) -> String;

    /// Decode an upstream body for the given action
    fn parse_response(
        &self,
        body: &[u8],
        action: ActionKind,
    ) -> Result<Parsed<Self::Response>, GatewayError>;

    /// Media type for a single resource
    fn content_type(&self) -> &'static str;

    /// Media type for a list of resources
    fn collection_content_type(&self) -> String {
        format!("{}{}", self.content_type(), COLLECTION_SUFFIX)
    }

    /// Caller-facing relative href for an upstream resource id
    fn href(&self, upstream_id: &str) -> Result<String, GatewayError>;
}

/// Common ARM resource envelope returned by tracked resources
///
/// Fields the gateway does not model are kept in `extra` so nothing the
/// provider returns is dropped on the way to the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackedResource {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<GenericRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(flatten)]
    pub extra: GenericRecord,
}

/// Resources whose parsed body can carry an injected href
pub trait Linkable {
    fn upstream_id(&self) -> &str;
    fn set_href(&mut self, href: String);
}

impl Linkable for TrackedResource {
    fn upstream_id(&self) -> &str {
        &self.id
    }

    fn set_href(&mut self, href: String) {
        self.href = Some(href);
    }
}

/// Shared `parse_response` behaviour
///
/// Create hands the href back as a `Location` header; every other action
/// writes it into the body.
pub fn parse_linked<R, T>(
    resource: &R,
    body: &[u8],
    action: ActionKind,
) -> Result<Parsed<T>, GatewayError>
where
    R: AzureResource + ?Sized,
    T: DeserializeOwned + Linkable,
{
    let mut parsed: T = serde_json::from_slice(body).map_err(|_| GatewayError::malformed(body))?;
    let href = resource.href(parsed.upstream_id())?;

    if action == ActionKind::Create {
        return Ok(Parsed {
            body: parsed,
            location: Some(href),
        });
    }

    parsed.set_href(href);
    Ok(Parsed {
        body: parsed,
        location: None,
    })
}

/// Decode caller JSON into a create-input struct
pub fn decode_input<T: DeserializeOwned>(input: &[u8]) -> Result<T, GatewayError> {
    serde_json::from_slice(input).map_err(|e| GatewayError::Decode(e.to_string()))
}

/// Reject empty required fields
pub fn require<'a>(field: &str, value: &'a str) -> Result<&'a str, GatewayError> {
    if value.trim().is_empty() {
        return Err(GatewayError::Decode(format!("missing field `{}`", field)));
    }
    Ok(value)
}

// =========================================================================
// Path helpers
// =========================================================================

fn segment(value: &str) -> std::borrow::Cow<'_, str> {
    urlencoding::encode(value)
}

/// `/subscriptions/{s}/{rest}?api-version={v}`
pub fn subscription_path(subscription: &str, rest: &str, api_version: &str) -> String {
    format!(
        "/subscriptions/{}/{}?api-version={}",
        segment(subscription),
        rest,
        api_version
    )
}

/// `/subscriptions/{s}/resourceGroups/{g}/{rest}?api-version={v}`
pub fn group_path(subscription: &str, group: &str, rest: &str, api_version: &str) -> String {
    format!(
        "/subscriptions/{}/resourceGroups/{}/{}?api-version={}",
        segment(subscription),
        segment(group),
        rest,
        api_version
    )
}

/// Path to one named resource under a provider path inside a group
pub fn group_resource_path(
    subscription: &str,
    group: &str,
    provider_path: &str,
    name: &str,
    api_version: &str,
) -> String {
    group_path(
        subscription,
        group,
        &format!("{}/{}", provider_path, segment(name)),
        api_version,
    )
}

/// Collection path honouring the no-parent fallback
pub fn scoped_collection_path(
    subscription: &str,
    group: &str,
    provider_path: &str,
    api_version: &str,
) -> String {
    if group.is_empty() {
        subscription_path(subscription, provider_path, api_version)
    } else {
        group_path(subscription, group, provider_path, api_version)
    }
}

// =========================================================================
// Href helpers
// =========================================================================

fn bad_id(upstream_id: &str) -> GatewayError {
    GatewayError::MalformedUpstreamBody {
        excerpt: crate::error::excerpt(&format!("unexpected resource id '{}'", upstream_id)),
    }
}

/// `.../resourceGroups/{g}/providers/{ns}/{type}/{name}` -> `resource_groups/{g}/{collection}/{name}`
///
/// Offsets are taken from the end of the id: the prefix before the resource
/// group varies in depth between scopes.
pub fn group_scoped_href(upstream_id: &str, collection: &str) -> Result<String, GatewayError> {
    let segments: Vec<&str> = upstream_id.trim_end_matches('/').split('/').collect();
    let n = segments.len();
    if n < 6 || !segments[n - 6].eq_ignore_ascii_case("resourceGroups") {
        return Err(bad_id(upstream_id));
    }
    let (group, name) = (segments[n - 5], segments[n - 1]);
    if group.is_empty() || name.is_empty() {
        return Err(bad_id(upstream_id));
    }
    Ok(format!("resource_groups/{}/{}/{}", group, collection, name))
}

/// `.../{name}` -> `{collection}/{name}`
pub fn trailing_href(upstream_id: &str, collection: &str) -> Result<String, GatewayError> {
    match upstream_id.trim_end_matches('/').rsplit('/').next() {
        Some(name) if !name.is_empty() => Ok(format!("{}/{}", collection, name)),
        _ => Err(bad_id(upstream_id)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_scoped_href() {
        let id = "/subscriptions/s/resourceGroups/web/providers/Microsoft.Compute/availabilitySets/front";
        assert_eq!(
            group_scoped_href(id, "availability_sets").unwrap(),
            "resource_groups/web/availability_sets/front"
        );
    }

    #[test]
    fn test_group_scoped_href_case_insensitive_marker() {
        let id = "/subscriptions/s/resourcegroups/web/providers/Microsoft.Storage/storageAccounts/logs";
        assert_eq!(
            group_scoped_href(id, "storage_accounts").unwrap(),
            "resource_groups/web/storage_accounts/logs"
        );
    }

    #[test]
    fn test_group_scoped_href_rejects_short_ids() {
        assert!(group_scoped_href("", "x").is_err());
        assert!(group_scoped_href("/subscriptions/s", "x").is_err());
        assert!(group_scoped_href("/a/b/c/d/e/f", "x").is_err());
    }

    #[test]
    fn test_trailing_href() {
        assert_eq!(
            trailing_href("/subscriptions/s/providers/Microsoft.Compute", "providers").unwrap(),
            "providers/Microsoft.Compute"
        );
        assert!(trailing_href("", "providers").is_err());
    }

    #[test]
    fn test_collection_fallback_without_group() {
        let scoped = scoped_collection_path("sub", "g1", "providers/Microsoft.Compute/availabilitySets", "v");
        let global = scoped_collection_path("sub", "", "providers/Microsoft.Compute/availabilitySets", "v");
        assert_eq!(
            scoped,
            "/subscriptions/sub/resourceGroups/g1/providers/Microsoft.Compute/availabilitySets?api-version=v"
        );
        assert_eq!(
            global,
            "/subscriptions/sub/providers/Microsoft.Compute/availabilitySets?api-version=v"
        );
    }

    #[test]
    fn test_path_segments_are_encoded() {
        let path = group_resource_path("s", "my group", "providers/X/y", "a/b", "v");
        assert_eq!(
            path,
            "/subscriptions/s/resourceGroups/my%20group/providers/X/y/a%2Fb?api-version=v"
        );
    }

    #[test]
    fn test_tracked_resource_keeps_unknown_fields() {
        let parsed: TrackedResource =
            serde_json::from_str(r#"{"id":"i","location":"westus","sku":{"name":"Aligned"}}"#).unwrap();
        assert_eq!(parsed.extra["sku"]["name"], "Aligned");
        let back = serde_json::to_value(&parsed).unwrap();
        assert_eq!(back["sku"]["name"], "Aligned");
    }

    #[test]
    fn test_require_rejects_blank() {
        assert!(require("name", "  ").is_err());
        assert_eq!(require("name", "x").unwrap(), "x");
    }
}
