//! REST client for the Bungie.net platform.
//!
//! Wraps the three kinds of upstream call the gateway makes: the OAuth token
//! exchange, the current-user membership lookup, and raw `GET`s against an
//! arbitrary `/Platform` path. No call is ever retried; authorization codes
//! are single-use and proxied reads are the caller's to repeat.

use std::time::Duration;

use serde::Deserialize;
use vanguard_core::session::{TokenGrant, UserProfile};
use vanguard_core::upstream::{envelope_fault, UpstreamFault};

use crate::error::BungieError;

/// Production platform origin.
pub const DEFAULT_BASE_URL: &str = "https://www.bungie.net";

/// Default bound on any single upstream call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const API_KEY_HEADER: &str = "X-API-Key";
const TOKEN_PATH: &str = "/Platform/App/OAuth/token/";
const AUTHORIZE_PATH: &str = "/en/OAuth/Authorize";
const MEMBERSHIPS_PATH: &str = "/User/GetMembershipsForCurrentUser/";

/// Confidential OAuth client credentials.
#[derive(Clone)]
pub struct OAuthCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl std::fmt::Debug for OAuthCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Status and raw body of a proxied platform call.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: String,
}

#[derive(Debug, Deserialize)]
struct MembershipEnvelope {
    #[serde(rename = "Response")]
    response: Option<UserProfile>,
}

/// HTTP client for the platform API.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct BungieClient {
    client: reqwest::Client,
    base_url: String,
}

impl BungieClient {
    /// Create a client for `base_url` (e.g. [`DEFAULT_BASE_URL`]) whose
    /// requests give up after `timeout`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, BungieError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL of a `/Platform` endpoint path, appended verbatim.
    pub fn platform_url(&self, endpoint: &str) -> String {
        format!("{}/Platform{}", self.base_url, endpoint)
    }

    pub fn token_url(&self) -> String {
        format!("{}{}", self.base_url, TOKEN_PATH)
    }

    /// Browser-facing authorization page.
    pub fn authorize_url(&self) -> String {
        format!("{}{}", self.base_url, AUTHORIZE_PATH)
    }

    /// Trade an authorization code for upstream tokens.
    ///
    /// Makes exactly one `POST` to the token endpoint. A non-2xx answer is
    /// surfaced as [`BungieError::ExchangeFailed`]; `code`/`redirect_uri`
    /// mismatches are the upstream's to reject.
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
        credentials: &OAuthCredentials,
    ) -> Result<TokenGrant, BungieError> {
        let form = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
        ];

        let response = self.client.post(self.token_url()).form(&form).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            tracing::warn!(status = status.as_u16(), body = %body, "Token exchange rejected");
            return Err(BungieError::ExchangeFailed {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| BungieError::InvalidBody(format!("token response: {e}")))
    }

    /// Fetch the profile and linked memberships of the token's owner.
    pub async fn memberships_for_current_user(
        &self,
        access_token: &str,
        api_key: &str,
    ) -> Result<UserProfile, BungieError> {
        let response = self.get(MEMBERSHIPS_PATH, api_key, Some(access_token)).await?;

        if !(200..300).contains(&response.status) {
            return Err(BungieError::HttpStatus {
                status: response.status,
                body: response.body,
            });
        }

        let body: serde_json::Value = serde_json::from_str(&response.body)
            .map_err(|e| BungieError::InvalidBody(e.to_string()))?;

        if let Some(fault) = envelope_fault(&body)? {
            return Err(BungieError::Platform(fault));
        }

        let envelope: MembershipEnvelope = serde_json::from_value(body)
            .map_err(|e| BungieError::InvalidBody(format!("membership response: {e}")))?;

        envelope.response.ok_or_else(|| {
            BungieError::Platform(UpstreamFault {
                code: vanguard_core::upstream::SUCCESS_CODE,
                status: None,
                message: Some("membership response has no Response payload".to_string()),
            })
        })
    }

    /// Issue one `GET` against a `/Platform` path and return whatever came back.
    ///
    /// The HTTP status is reported, not judged; interpreting the envelope is
    /// the caller's job.
    pub async fn get(
        &self,
        endpoint: &str,
        api_key: &str,
        bearer: Option<&str>,
    ) -> Result<UpstreamResponse, BungieError> {
        let mut request = self
            .client
            .get(self.platform_url(endpoint))
            .header(API_KEY_HEADER, api_key)
            .header(reqwest::header::CONTENT_TYPE, "application/json");

        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(UpstreamResponse { status, body })
    }
}
