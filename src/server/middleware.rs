//! Request middleware
//!
//! - [`request_span`] opens the per-request tracing span around the request id
//! - [`azure_client_initializer`] turns caller cookies into a [`RequestContext`]
//!
//! Handlers read the context back through its `FromRequestParts` impl, which
//! fails with a configuration error when the initializer was not mounted.

use super::AppState;
use crate::azure::auth::{acquire_token, Credentials};
use crate::azure::{AzureClient, AzureHttpClient, RequestContext};
use crate::error::GatewayError;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;
use tower_http::request_id::RequestId;
use tracing::Span;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Span for one request, tagged with the id assigned by `SetRequestIdLayer`
pub fn request_span(request: &Request) -> Span {
    let id = request
        .extensions()
        .get::<RequestId>()
        .and_then(|id| id.header_value().to_str().ok())
        .unwrap_or_default();

    tracing::info_span!(
        "request",
        request_id = %id,
        method = %request.method(),
        path = %request.uri().path()
    )
}

/// Build credentials and an authenticated client for this request
pub async fn azure_client_initializer(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let cookies = request
        .headers()
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok());

    let credentials = match Credentials::from_cookie_headers(cookies) {
        Ok(credentials) => credentials,
        Err(e) => return e.into_response(),
    };

    let token = match acquire_token(
        &state.http,
        &state.config.auth_host,
        &format!("{}/", state.config.base_url),
        &credentials,
    )
    .await
    {
        Ok(token) => token,
        Err(e) => return e.into_response(),
    };

    tracing::debug!(?credentials, "credentials attached");

    let http = AzureHttpClient::new(state.http.clone(), token, &state.config.media_type);
    request.extensions_mut().insert(RequestContext {
        credentials: Arc::new(credentials),
        client: AzureClient::new(http, &state.config.base_url),
    });

    next.run(request).await
}

impl<S: Send + Sync> FromRequestParts<S> for RequestContext {
    type Rejection = GatewayError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<RequestContext>().cloned().ok_or_else(|| {
            GatewayError::Configuration(
                "failed to retrieve Azure client, check middleware".to_string(),
            )
        })
    }
}
