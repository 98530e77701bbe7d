//! Generic CRUD orchestrator
//!
//! Create, Get, List and Delete for any [`AzureResource`]. Each call is a
//! short state machine over one upstream request; nothing is kept between
//! calls.

use super::normalizer::{fetch_many, fetch_one};
use super::{ActionKind, AzureResource, GenericRecord};
use crate::azure::{RequestContext, UpstreamResponse};
use crate::error::GatewayError;
use crate::operation::{OperationHandle, OPERATION_ID_HEADER};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::Value;

/// What the caller receives from an orchestrated call
#[derive(Debug)]
pub enum Outcome<T> {
    /// Provider accepted the request asynchronously (202)
    Accepted(OperationHandle),
    /// Resource created synchronously (201)
    Created {
        body: T,
        location: Option<String>,
        content_type: String,
    },
    /// Resource or collection rendered (200)
    Rendered { body: T, content_type: String },
    /// Nothing to return (204)
    NoContent,
}

impl<T: Serialize> IntoResponse for Outcome<T> {
    fn into_response(self) -> Response {
        match self {
            Outcome::Accepted(handle) => (
                StatusCode::ACCEPTED,
                [(OPERATION_ID_HEADER, handle.operation_id)],
            )
                .into_response(),
            Outcome::Created {
                body,
                location,
                content_type,
            } => {
                let mut response = render(StatusCode::CREATED, &content_type, &body);
                if let Some(location) = location.and_then(|l| l.parse().ok()) {
                    response.headers_mut().insert(header::LOCATION, location);
                }
                response
            }
            Outcome::Rendered { body, content_type } => render(StatusCode::OK, &content_type, &body),
            Outcome::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

/// Serialize `body` as JSON with a resource-specific content type
pub fn render<T: Serialize + ?Sized>(status: StatusCode, content_type: &str, body: &T) -> Response {
    match serde_json::to_vec(body) {
        Ok(bytes) => (status, [(header::CONTENT_TYPE, content_type.to_string())], bytes).into_response(),
        Err(e) => GatewayError::Configuration(format!("failed to encode response: {}", e)).into_response(),
    }
}

/// Turn a provider `Location` header into a 202 outcome
fn accepted<T>(location: &str) -> Result<Outcome<T>, GatewayError> {
    let handle = OperationHandle::from_location(location).ok_or_else(|| {
        GatewayError::MalformedUpstreamBody {
            excerpt: format!("Location header without operation id: {}", location),
        }
    })?;
    tracing::info!(
        operation_id = %handle.operation_id,
        service = handle.service_kind.token(),
        "upstream accepted request asynchronously"
    );
    Ok(Outcome::Accepted(handle))
}

fn ensure_success(response: &UpstreamResponse, action: &str) -> Result<(), GatewayError> {
    if response.is_failure() {
        return Err(GatewayError::upstream(action, &response.body));
    }
    Ok(())
}

/// Create a resource from the caller's JSON body
pub async fn create<R: AzureResource>(
    ctx: &RequestContext,
    mut resource: R,
    input: &[u8],
) -> Result<Outcome<R::Response>, GatewayError> {
    let payload = resource.build_request_payload(input)?;
    let path = resource.resource_path(ctx.subscription());
    tracing::info!("Create request: {}", path);

    let response = ctx.client.put_json(&path, &payload).await?;
    ensure_success(&response, "creating resource")?;

    if let Some(location) = response.location.as_deref() {
        return accepted(location);
    }

    let parsed = resource.parse_response(&response.body, ActionKind::Create)?;
    Ok(Outcome::Created {
        body: parsed.body,
        location: parsed.location,
        content_type: resource.content_type().to_string(),
    })
}

/// Fetch and render a single resource
pub async fn get<R: AzureResource>(
    ctx: &RequestContext,
    resource: R,
) -> Result<Outcome<R::Response>, GatewayError> {
    let path = resource.resource_path(ctx.subscription());
    let body = fetch_one(&ctx.client, &path, resource.id()).await?;
    let parsed = resource.parse_response(&body, ActionKind::Get)?;

    Ok(Outcome::Rendered {
        body: parsed.body,
        content_type: resource.content_type().to_string(),
    })
}

/// List a collection, scoped to `parent` when non-empty
pub async fn list<R: AzureResource>(
    ctx: &RequestContext,
    resource: R,
    parent: &str,
) -> Result<Outcome<Vec<GenericRecord>>, GatewayError> {
    let path = resource.collection_path(parent, ctx.subscription());
    let mut records = fetch_many(&ctx.client, &path).await?;
    inject_hrefs(&resource, &mut records)?;

    Ok(Outcome::Rendered {
        body: records,
        content_type: resource.collection_content_type(),
    })
}

/// Delete a resource
pub async fn delete<R: AzureResource>(
    ctx: &RequestContext,
    resource: R,
) -> Result<Outcome<()>, GatewayError> {
    let path = resource.resource_path(ctx.subscription());
    tracing::info!("Delete request: {}", path);

    let response = ctx.client.delete(&path).await?;
    ensure_success(&response, "deleting resource")?;

    if let Some(location) = response.location.as_deref() {
        return accepted(location);
    }
    Ok(Outcome::NoContent)
}

/// Add `href` to every record; a record without a string `id` is an error
pub fn inject_hrefs<R: AzureResource + ?Sized>(
    resource: &R,
    records: &mut [GenericRecord],
) -> Result<(), GatewayError> {
    for record in records.iter_mut() {
        let href = match record.get("id") {
            Some(Value::String(id)) => resource.href(id)?,
            _ => {
                let raw = serde_json::to_string(record).unwrap_or_default();
                return Err(GatewayError::MalformedUpstreamBody {
                    excerpt: crate::error::excerpt(&format!("record without id: {}", raw)),
                });
            }
        };
        record.insert("href".to_string(), Value::String(href));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::kinds::AvailabilitySet;
    use serde_json::json;

    fn record(value: Value) -> GenericRecord {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_inject_hrefs() {
        let mut records = vec![record(json!({
            "id": "/subscriptions/s/resourceGroups/g/providers/Microsoft.Compute/availabilitySets/a1"
        }))];
        inject_hrefs(&AvailabilitySet::default(), &mut records).unwrap();
        assert_eq!(records[0]["href"], "resource_groups/g/availability_sets/a1");
    }

    #[test]
    fn test_inject_hrefs_requires_id() {
        let mut records = vec![record(json!({"name": "a1"}))];
        let err = inject_hrefs(&AvailabilitySet::default(), &mut records).unwrap_err();
        assert!(matches!(err, GatewayError::MalformedUpstreamBody { .. }));
    }

    #[test]
    fn test_accepted_outcome_response() {
        let outcome: Outcome<()> =
            accepted("https://m/subscriptions/s/operationResults/abc123?api-version=X").unwrap();
        let response = outcome.into_response();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(response.headers()["operationid"], "abc123");
    }

    #[test]
    fn test_created_outcome_sets_location_and_type() {
        let outcome = Outcome::Created {
            body: json!({"id": "x"}),
            location: Some("resource_groups/g/availability_sets/a".to_string()),
            content_type: "vnd.rightscale.availability_set+json".to_string(),
        };
        let response = outcome.into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[header::LOCATION], "resource_groups/g/availability_sets/a");
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "vnd.rightscale.availability_set+json"
        );
    }

    #[test]
    fn test_no_content_outcome() {
        let response = Outcome::<()>::NoContent.into_response();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }
}
