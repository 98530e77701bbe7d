//! Response Normalizer
//!
//! ARM endpoints disagree on how collections are wrapped. Most use
//! `{"value": [...], "nextLink": "..."}`, some catalog endpoints return a bare
//! array. Single-resource fetches return the raw body for the kind's own parser.

use super::GenericRecord;
use crate::azure::AzureClient;
use crate::error::GatewayError;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;

/// `{"value": [...]}` envelope
#[derive(Debug, Deserialize)]
struct ValueEnvelope {
    value: Vec<GenericRecord>,
    #[serde(default, rename = "nextLink")]
    next_link: Option<String>,
}

/// One decoded page of a collection
#[derive(Debug, Default, PartialEq)]
pub struct Page {
    pub records: Vec<GenericRecord>,
    pub next_link: Option<String>,
}

/// Decode one collection body
///
/// The `value` envelope is tried strictly before the bare array. Only a JSON
/// object can be an envelope.
pub fn decode_collection(body: &[u8]) -> Result<Page, GatewayError> {
    let value: Value = serde_json::from_slice(body).map_err(|_| GatewayError::malformed(body))?;

    match value {
        Value::Object(_) => {
            let envelope: ValueEnvelope =
                serde_json::from_value(value).map_err(|_| GatewayError::malformed(body))?;
            Ok(Page {
                records: envelope.value,
                next_link: envelope.next_link.filter(|link| !link.is_empty()),
            })
        }
        Value::Array(_) => {
            let records: Vec<GenericRecord> =
                serde_json::from_value(value).map_err(|_| GatewayError::malformed(body))?;
            Ok(Page {
                records,
                next_link: None,
            })
        }
        _ => Err(GatewayError::malformed(body)),
    }
}

/// Fetch every record of a collection, following `nextLink` pages in order
///
/// Paging stops at the first link already visited. A link pointing away
/// from the configured upstream is rejected so the caller's token stays there.
pub async fn fetch_many(client: &AzureClient, path: &str) -> Result<Vec<GenericRecord>, GatewayError> {
    let mut records = Vec::new();
    let mut seen = HashSet::new();
    let mut next = Some(path.to_string());

    while let Some(current) = next.take() {
        if !seen.insert(client.url(&current)) {
            tracing::warn!("nextLink cycle at {}, stopping pagination", current);
            break;
        }
        if !client.is_upstream(&current) {
            return Err(GatewayError::MalformedUpstreamBody {
                excerpt: crate::error::excerpt(&format!("nextLink outside upstream: {}", current)),
            });
        }

        let response = client.get(&current).await?;
        if response.is_failure() {
            return Err(GatewayError::upstream("requesting resources", &response.body));
        }

        let page = decode_collection(&response.body)?;
        records.extend(page.records);
        next = page.next_link;
    }

    tracing::debug!("fetched {} records from {}", records.len(), path);
    Ok(records)
}

/// Fetch one resource body
///
/// `caller_id` is the identifier the caller used; it is what a not-found error
/// reports, never the upstream URL.
pub async fn fetch_one(
    client: &AzureClient,
    path: &str,
    caller_id: &str,
) -> Result<Vec<u8>, GatewayError> {
    let response = client.get(path).await?;

    if response.status.as_u16() == 404 {
        return Err(GatewayError::NotFound {
            id: caller_id.to_string(),
        });
    }
    if response.is_failure() {
        return Err(GatewayError::upstream("requesting resource", &response.body));
    }

    Ok(response.body)
}
