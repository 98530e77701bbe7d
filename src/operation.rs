//! Long-running operation bridge
//!
//! ARM answers slow PUT/DELETE calls with `202 Accepted` and a `Location`
//! header pointing at a status resource. The gateway hands the caller only the
//! operation id; polling rebuilds the status URL from the service kind and
//! location carried in the poll route. No operation table exists: every poll
//! asks the provider again.

use crate::azure::RequestContext;
use crate::error::GatewayError;
use reqwest::StatusCode;
use serde::Serialize;

/// Media type of the poll response
pub const OPERATION_CONTENT_TYPE: &str = "vnd.rightscale.operation+json";

/// Response header carrying the operation id on 202 answers
pub const OPERATION_ID_HEADER: &str = "OperationId";

const STORAGE_API_VERSION: &str = "2015-06-15";
const COMPUTE_API_VERSION: &str = "2015-05-01-preview";
const NETWORK_API_VERSION: &str = "2015-06-15";
const GENERIC_API_VERSION: &str = "2015-11-01";

/// Which status-check URL template applies to an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceKind {
    Storage,
    Compute,
    Network,
    /// Subscription-scoped operation results; used for any unrecognized token
    Generic,
}

impl ServiceKind {
    /// Parse the caller's service token
    ///
    /// Accepts the short form (`compute`) and the provider namespace
    /// (`microsoft.compute`) case-insensitively. Anything else is `Generic`.
    pub fn from_token(token: &str) -> Self {
        match token.to_ascii_lowercase().as_str() {
            "storage" | "microsoft.storage" => ServiceKind::Storage,
            "compute" | "microsoft.compute" => ServiceKind::Compute,
            "network" | "microsoft.network" => ServiceKind::Network,
            _ => ServiceKind::Generic,
        }
    }

    /// Token the caller should send back when polling
    pub fn token(self) -> &'static str {
        match self {
            ServiceKind::Storage => "storage",
            ServiceKind::Compute => "microsoft.compute",
            ServiceKind::Network => "microsoft.network",
            ServiceKind::Generic => "generic",
        }
    }

    /// Status-check path relative to the upstream base URL
    pub fn status_path(self, subscription: &str, location: &str, operation_id: &str) -> String {
        let subscription = urlencoding::encode(subscription);
        let location = urlencoding::encode(location);
        let operation_id = urlencoding::encode(operation_id);
        match self {
            ServiceKind::Storage => format!(
                "/subscriptions/{}/providers/Microsoft.Storage/operations/{}?monitor=true&api-version={}",
                subscription, operation_id, STORAGE_API_VERSION
            ),
            ServiceKind::Compute => format!(
                "/subscriptions/{}/providers/Microsoft.Compute/locations/{}/operations/{}?monitor=true&api-version={}",
                subscription, location, operation_id, COMPUTE_API_VERSION
            ),
            ServiceKind::Network => format!(
                "/subscriptions/{}/providers/Microsoft.Network/locations/{}/operationResults/{}?api-version={}",
                subscription, location, operation_id, NETWORK_API_VERSION
            ),
            ServiceKind::Generic => format!(
                "/subscriptions/{}/operationresults/{}?api-version={}",
                subscription, operation_id, GENERIC_API_VERSION
            ),
        }
    }
}

/// Opaque handle round-tripped through the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationHandle {
    pub service_kind: ServiceKind,
    pub location_hint: Option<String>,
    pub operation_id: String,
}

impl OperationHandle {
    /// Handle rebuilt from poll route parameters
    pub fn new(service: &str, location: &str, operation_id: &str) -> Self {
        Self {
            service_kind: ServiceKind::from_token(service),
            location_hint: Some(location.to_string()).filter(|l| !l.is_empty()),
            operation_id: operation_id.to_string(),
        }
    }

    /// Derive a handle from a provider `Location` header
    ///
    /// The operation id is the last path segment before any query string. The
    /// service kind and location are read from the `providers/{ns}` and
    /// `locations/{l}` segments when present.
    pub fn from_location(location: &str) -> Option<Self> {
        let path = match url::Url::parse(location) {
            Ok(url) => url.path().to_string(),
            Err(_) => location.split(['?', '#']).next().unwrap_or_default().to_string(),
        };

        let segments: Vec<&str> = path.trim_end_matches('/').split('/').collect();
        let operation_id = segments.last().copied().filter(|id| !id.is_empty())?;

        let after = |marker: &str| {
            segments
                .windows(2)
                .find(|pair| pair[0].eq_ignore_ascii_case(marker))
                .map(|pair| pair[1].to_string())
        };

        let service_kind = after("providers")
            .map(|ns| ServiceKind::from_token(&ns))
            .unwrap_or(ServiceKind::Generic);

        Some(Self {
            service_kind,
            location_hint: after("locations"),
            operation_id: operation_id.to_string(),
        })
    }

    /// Caller-facing href of the operation
    pub fn href(&self) -> String {
        match &self.location_hint {
            Some(location) => format!("locations/{}/operations/{}", location, self.operation_id),
            None => format!("operations/{}", self.operation_id),
        }
    }
}

/// Normalized operation state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperationStatus {
    InProgress,
    Succeeded,
    Failed,
}

/// Poll response body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationReport {
    pub status: OperationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    pub href: String,
}

/// Map an upstream status-check answer onto the three-state status
pub fn classify(
    status: StatusCode,
    location: Option<&str>,
    operation_id: &str,
) -> (OperationStatus, Option<String>) {
    match status.as_u16() {
        202 => (OperationStatus::InProgress, None),
        200 | 204 => (OperationStatus::Succeeded, None),
        code => {
            let reason = if code == 404 {
                format!("Could not find operation with id '{}'", operation_id)
            } else {
                location
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("upstream returned status {}", code))
            };
            (
                OperationStatus::Failed,
                Some(format!(
                    "Error has occurred while requesting async operation: {}",
                    reason
                )),
            )
        }
    }
}

/// Ask the provider for the current status of an operation
///
/// A failed operation is a successful poll; only a failure to reach the
/// provider is returned as an error.
pub async fn poll(
    ctx: &RequestContext,
    handle: &OperationHandle,
) -> Result<OperationReport, GatewayError> {
    let path = handle.service_kind.status_path(
        ctx.subscription(),
        handle.location_hint.as_deref().unwrap_or_default(),
        &handle.operation_id,
    );
    let response = ctx.client.get(&path).await?;

    let (status, details) = classify(
        response.status,
        response.location.as_deref(),
        &handle.operation_id,
    );
    tracing::debug!(
        operation_id = %handle.operation_id,
        upstream_status = response.status.as_u16(),
        "operation status {:?}",
        status
    );

    Ok(OperationReport {
        status,
        details,
        href: handle.href(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_kind_tokens() {
        assert_eq!(ServiceKind::from_token("storage"), ServiceKind::Storage);
        assert_eq!(ServiceKind::from_token("Microsoft.Compute"), ServiceKind::Compute);
        assert_eq!(ServiceKind::from_token("microsoft.network"), ServiceKind::Network);
        assert_eq!(ServiceKind::from_token("microsoft.web"), ServiceKind::Generic);
        assert_eq!(ServiceKind::from_token(""), ServiceKind::Generic);
    }

    #[test]
    fn test_status_paths() {
        assert_eq!(
            ServiceKind::Storage.status_path("s", "westus", "op"),
            "/subscriptions/s/providers/Microsoft.Storage/operations/op?monitor=true&api-version=2015-06-15"
        );
        assert_eq!(
            ServiceKind::Compute.status_path("s", "westus", "op"),
            "/subscriptions/s/providers/Microsoft.Compute/locations/westus/operations/op?monitor=true&api-version=2015-05-01-preview"
        );
        assert_eq!(
            ServiceKind::Network.status_path("s", "westus", "op"),
            "/subscriptions/s/providers/Microsoft.Network/locations/westus/operationResults/op?api-version=2015-06-15"
        );
        assert_eq!(
            ServiceKind::Generic.status_path("s", "westus", "op"),
            "/subscriptions/s/operationresults/op?api-version=2015-11-01"
        );
    }

    #[test]
    fn test_handle_from_compute_location() {
        let handle = OperationHandle::from_location(
            "https://management.azure.com/subscriptions/s/providers/Microsoft.Compute/locations/westus/operations/abc?monitor=true&api-version=2015-05-01-preview",
        )
        .unwrap();
        assert_eq!(handle.operation_id, "abc");
        assert_eq!(handle.service_kind, ServiceKind::Compute);
        assert_eq!(handle.location_hint.as_deref(), Some("westus"));
        assert_eq!(handle.href(), "locations/westus/operations/abc");
    }

    #[test]
    fn test_handle_from_generic_location() {
        let handle = OperationHandle::from_location(
            "https://management.azure.com/subscriptions/s/operationresults/xyz?api-version=2015-11-01",
        )
        .unwrap();
        assert_eq!(handle.operation_id, "xyz");
        assert_eq!(handle.service_kind, ServiceKind::Generic);
        assert!(handle.location_hint.is_none());
    }

    #[test]
    fn test_handle_from_relative_location() {
        let handle =
            OperationHandle::from_location("/subscriptions/s/operationResults/abc123?api-version=X")
                .unwrap();
        assert_eq!(handle.operation_id, "abc123");
    }

    #[test]
    fn test_handle_rejects_empty_id() {
        assert!(OperationHandle::from_location("").is_none());
        assert!(OperationHandle::from_location("?api-version=1").is_none());
    }

    #[test]
    fn test_classify() {
        assert_eq!(
            classify(StatusCode::ACCEPTED, None, "a"),
            (OperationStatus::InProgress, None)
        );
        assert_eq!(classify(StatusCode::OK, None, "a").0, OperationStatus::Succeeded);
        assert_eq!(classify(StatusCode::NO_CONTENT, None, "a").0, OperationStatus::Succeeded);

        let (status, details) = classify(StatusCode::NOT_FOUND, Some("ignored"), "khrvi1");
        assert_eq!(status, OperationStatus::Failed);
        assert_eq!(
            details.as_deref(),
            Some("Error has occurred while requesting async operation: Could not find operation with id 'khrvi1'")
        );

        let (_, details) = classify(StatusCode::CONFLICT, Some("https://x/failure"), "a");
        assert_eq!(
            details.as_deref(),
            Some("Error has occurred while requesting async operation: https://x/failure")
        );

        let (_, details) = classify(StatusCode::INTERNAL_SERVER_ERROR, None, "a");
        assert!(details.unwrap().ends_with("upstream returned status 500"));
    }

    #[test]
    fn test_report_serialization() {
        let report = OperationReport {
            status: OperationStatus::InProgress,
            details: None,
            href: "locations/westus/operations/a".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&report).unwrap(),
            r#"{"status":"in-progress","href":"locations/westus/operations/a"}"#
        );
    }
}
