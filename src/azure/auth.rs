//! Azure Authentication
//!
//! Builds per-request credentials from the caller's cookies and turns them into
//! a bearer token. Either an access token is supplied directly, or a refresh
//! token bundle is exchanged at the Azure AD token endpoint. Nothing is cached:
//! credentials live for exactly one inbound request.

use crate::error::GatewayError;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;

pub const COOKIE_SUBSCRIPTION: &str = "SubscriptionID";
pub const COOKIE_ACCESS_TOKEN: &str = "AccessToken";
pub const COOKIE_TENANT: &str = "TenantID";
pub const COOKIE_CLIENT_ID: &str = "ClientID";
pub const COOKIE_CLIENT_SECRET: &str = "ClientSecret";
pub const COOKIE_REFRESH_TOKEN: &str = "RefreshToken";

/// Secret half of the credentials: exactly one form is present per request
#[derive(Clone, PartialEq, Eq)]
pub enum CredentialSecret {
    AccessToken(String),
    Refresh {
        tenant_id: String,
        client_id: String,
        client_secret: String,
        refresh_token: String,
    },
}

/// Per-request identity bundle
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub subscription_id: String,
    pub secret: CredentialSecret,
}

// Secrets never reach the logs
impl fmt::Debug for CredentialSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSecret::AccessToken(_) => f.write_str("AccessToken(..)"),
            CredentialSecret::Refresh { tenant_id, .. } => f
                .debug_struct("Refresh")
                .field("tenant_id", tenant_id)
                .finish_non_exhaustive(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("subscription_id", &self.subscription_id)
            .field("secret", &self.secret)
            .finish()
    }
}

impl Credentials {
    /// Build credentials from raw `Cookie` header values
    pub fn from_cookie_headers<'a>(
        headers: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, GatewayError> {
        let cookies = parse_cookies(headers);
        let get = |name: &str| cookies.get(name).filter(|v| !v.is_empty()).cloned();

        let subscription_id = get(COOKIE_SUBSCRIPTION).ok_or_else(|| {
            GatewayError::Unauthorized(format!("missing {} cookie", COOKIE_SUBSCRIPTION))
        })?;

        if let Some(token) = get(COOKIE_ACCESS_TOKEN) {
            return Ok(Self {
                subscription_id,
                secret: CredentialSecret::AccessToken(token),
            });
        }

        match (
            get(COOKIE_TENANT),
            get(COOKIE_CLIENT_ID),
            get(COOKIE_CLIENT_SECRET),
            get(COOKIE_REFRESH_TOKEN),
        ) {
            (Some(tenant_id), Some(client_id), Some(client_secret), Some(refresh_token)) => {
                Ok(Self {
                    subscription_id,
                    secret: CredentialSecret::Refresh {
                        tenant_id,
                        client_id,
                        client_secret,
                        refresh_token,
                    },
                })
            }
            _ => Err(GatewayError::Unauthorized(format!(
                "either {} or {}/{}/{}/{} cookies are required",
                COOKIE_ACCESS_TOKEN,
                COOKIE_TENANT,
                COOKIE_CLIENT_ID,
                COOKIE_CLIENT_SECRET,
                COOKIE_REFRESH_TOKEN
            ))),
        }
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Resolve a bearer token for the given credentials
///
/// `resource` is the audience requested from Azure AD (the ARM base URL).
pub async fn acquire_token(
    http: &reqwest::Client,
    auth_host: &str,
    resource: &str,
    credentials: &Credentials,
) -> Result<String, GatewayError> {
    let (tenant_id, client_id, client_secret, refresh_token) = match &credentials.secret {
        CredentialSecret::AccessToken(token) => return Ok(token.clone()),
        CredentialSecret::Refresh {
            tenant_id,
            client_id,
            client_secret,
            refresh_token,
        } => (tenant_id, client_id, client_secret, refresh_token),
    };

    let url = format!(
        "{}/{}/oauth2/token",
        auth_host,
        urlencoding::encode(tenant_id)
    );
    tracing::debug!("POST {}", url);

    let response = http
        .post(&url)
        .form(&[
            ("grant_type", "refresh_token"),
            ("client_id", client_id.as_str()),
            ("client_secret", client_secret.as_str()),
            ("refresh_token", refresh_token.as_str()),
            ("resource", resource),
        ])
        .send()
        .await
        .map_err(|e| GatewayError::Unauthorized(format!("token request failed: {}", e)))?;

    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|e| GatewayError::Unauthorized(format!("token response unreadable: {}", e)))?;

    if !status.is_success() {
        tracing::warn!("token refresh rejected with status {}", status);
        return Err(GatewayError::Unauthorized(format!(
            "token refresh rejected with status {}",
            status.as_u16()
        )));
    }

    let token: TokenResponse = serde_json::from_slice(&body).map_err(|_| GatewayError::malformed(&body))?;
    Ok(token.access_token)
}

/// Parse `name=value` pairs out of one or more Cookie headers
fn parse_cookies<'a>(headers: impl IntoIterator<Item = &'a str>) -> HashMap<String, String> {
    headers
        .into_iter()
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            Some((name.trim().to_string(), value.trim().trim_matches('"').to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_token_cookie() {
        let creds =
            Credentials::from_cookie_headers(["SubscriptionID=sub-1; AccessToken=abc"]).unwrap();
        assert_eq!(creds.subscription_id, "sub-1");
        assert_eq!(creds.secret, CredentialSecret::AccessToken("abc".to_string()));
    }

    #[test]
    fn test_refresh_bundle_across_headers() {
        let creds = Credentials::from_cookie_headers([
            "SubscriptionID=sub-1; TenantID=t",
            "ClientID=c; ClientSecret=s; RefreshToken=r",
        ])
        .unwrap();
        assert!(matches!(
            creds.secret,
            CredentialSecret::Refresh { ref tenant_id, .. } if tenant_id == "t"
        ));
    }

    #[test]
    fn test_access_token_wins_over_refresh_bundle() {
        let creds = Credentials::from_cookie_headers([
            "SubscriptionID=s; AccessToken=tok; TenantID=t; ClientID=c; ClientSecret=x; RefreshToken=r",
        ])
        .unwrap();
        assert!(matches!(creds.secret, CredentialSecret::AccessToken(_)));
    }

    #[test]
    fn test_missing_subscription_rejected() {
        let err = Credentials::from_cookie_headers(["AccessToken=abc"]).unwrap_err();
        assert!(matches!(err, GatewayError::Unauthorized(_)));
    }

    #[test]
    fn test_partial_refresh_bundle_rejected() {
        let err =
            Credentials::from_cookie_headers(["SubscriptionID=s; TenantID=t; ClientID=c"]).unwrap_err();
        assert!(matches!(err, GatewayError::Unauthorized(_)));
    }

    #[test]
    fn test_debug_hides_secrets() {
        let creds =
            Credentials::from_cookie_headers(["SubscriptionID=s; AccessToken=very-secret"]).unwrap();
        assert!(!format!("{:?}", creds).contains("very-secret"));
    }

    #[test]
    fn test_secret_debug_names_variant_only() {
        let token = CredentialSecret::AccessToken("very-secret".to_string());
        assert_eq!(format!("{:?}", token), "AccessToken(..)");

        let refresh = CredentialSecret::Refresh {
            tenant_id: "t".to_string(),
            client_id: "c".to_string(),
            client_secret: "hidden-secret".to_string(),
            refresh_token: "hidden-refresh".to_string(),
        };
        let rendered = format!("{:?}", refresh);
        assert!(rendered.starts_with("Refresh"));
        assert!(!rendered.contains("hidden"));
    }
}
