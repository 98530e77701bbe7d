//! Gateway error taxonomy
//!
//! Every core operation returns a [`GatewayError`] instead of panicking. The
//! axum rendering lives here too so handlers can simply use `?`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Maximum length of an upstream body kept in error messages and logs
const MAX_EXCERPT_LENGTH: usize = 512;

/// Errors surfaced by the gateway core
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Caller payload malformed (missing fields, wrong types)
    #[error("Error has occurred while decoding params: {0}")]
    Decode(String),

    /// Upstream returned 404 for a single-resource fetch
    #[error("Could not find resource with id: {id}")]
    NotFound { id: String },

    /// Upstream returned >= 400 (other than a handled 404), or the call itself failed
    #[error("Error has occurred while {action}: {body}")]
    Upstream { action: String, body: String },

    /// 2xx upstream body that matches none of the recognized shapes
    #[error("got bad response from server: {excerpt}")]
    MalformedUpstreamBody { excerpt: String },

    /// Per-request context missing; middleware wiring defect
    #[error("{0}")]
    Configuration(String),

    /// Caller credentials missing or rejected by the identity provider
    #[error("{0}")]
    Unauthorized(String),

    /// Request conflicts with the current upstream state
    #[error("{0}")]
    Conflict(String),
}

impl GatewayError {
    /// Build an upstream failure from an action description and raw body
    pub fn upstream(action: impl Into<String>, body: impl AsRef<[u8]>) -> Self {
        Self::Upstream {
            action: action.into(),
            body: String::from_utf8_lossy(body.as_ref()).into_owned(),
        }
    }

    /// Build a malformed-body error carrying a truncated excerpt
    pub fn malformed(body: impl AsRef<[u8]>) -> Self {
        Self::MalformedUpstreamBody {
            excerpt: excerpt(&String::from_utf8_lossy(body.as_ref())),
        }
    }

    /// HTTP status used when rendering this error to the caller
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Decode(_) => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Upstream { .. } | Self::MalformedUpstreamBody { .. } => StatusCode::BAD_GATEWAY,
            Self::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code for the JSON error body
    pub fn code(&self) -> &'static str {
        match self {
            Self::Decode(_) => "bad_request",
            Self::NotFound { .. } => "record_not_found",
            Self::Upstream { .. } => "upstream_failure",
            Self::MalformedUpstreamBody { .. } => "bad_upstream_response",
            Self::Configuration(_) => "internal_error",
            Self::Unauthorized(_) => "unauthorized",
            Self::Conflict(_) => "conflict",
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        Self::Upstream {
            action: "sending request to Azure".to_string(),
            body: err.to_string(),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(code = self.code(), "{}", sanitize_for_log(&message));
        } else {
            tracing::info!(code = self.code(), "{}", message);
        }

        let body = match &self {
            Self::NotFound { id } => json!({ "code": self.code(), "message": message, "id": id }),
            _ => json!({ "code": self.code(), "message": message }),
        };

        (status, Json(body)).into_response()
    }
}

/// Truncate a body to a diagnosable excerpt, respecting char boundaries
pub fn excerpt(body: &str) -> String {
    if body.len() <= MAX_EXCERPT_LENGTH {
        return body.to_string();
    }
    let mut end = MAX_EXCERPT_LENGTH;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... [truncated, {} bytes total]", &body[..end], body.len())
}

/// Sanitize text for logging: truncate and drop control characters
pub fn sanitize_for_log(body: &str) -> String {
    excerpt(body).replace(|c: char| c.is_control() && c != ' ', "")
}
