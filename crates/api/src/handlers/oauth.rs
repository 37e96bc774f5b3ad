//! Handlers for the browser side of the OAuth flow.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header::{AUTHORIZATION, HOST, ORIGIN};
use axum::http::{HeaderMap, HeaderName};
use axum::Json;
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use vanguard_core::session::{DestinyMembership, PlatformUser, TokenGrant};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Page on the client origin the platform redirects back to.
const CALLBACK_PATH: &str = "/oauth-callback.html";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthConfigResponse {
    pub client_id: String,
    pub redirect_uri: String,
    pub auth_url: String,
    pub scope: String,
}

/// Request body for `POST /api/oauth-token`.
#[derive(Debug, Default, Deserialize)]
pub struct OAuthTokenRequest {
    pub code: Option<String>,
    pub redirect_uri: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfoResponse {
    pub bungie_net_user: Option<PlatformUser>,
    pub destiny_memberships: Option<Vec<DestinyMembership>>,
    pub primary_membership_id: Option<String>,
    pub timestamp: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/oauth-config
///
/// Public half of the OAuth client configuration. The client secret never
/// leaves the server.
pub async fn oauth_config(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<OAuthConfigResponse>> {
    let client_id = state.client_id()?;

    Ok(Json(OAuthConfigResponse {
        client_id: client_id.to_string(),
        redirect_uri: redirect_uri(&headers),
        auth_url: state.dispatcher.client().authorize_url(),
        scope: state.config.bungie.oauth_scope.clone(),
    }))
}

/// POST /api/oauth-token
///
/// Trade an authorization code for tokens and relay the platform's payload.
pub async fn oauth_token(
    State(state): State<AppState>,
    body: Result<Json<OAuthTokenRequest>, JsonRejection>,
) -> AppResult<Json<TokenGrant>> {
    let credentials = state.oauth_credentials()?;

    let input = body.map(|Json(input)| input).unwrap_or_default();
    let (Some(code), Some(redirect_uri)) = (
        input.code.filter(|c| !c.is_empty()),
        input.redirect_uri.filter(|r| !r.is_empty()),
    ) else {
        return Err(AppError::BadRequest("Missing required parameters".into()));
    };

    let grant = state
        .dispatcher
        .client()
        .exchange_code(&code, &redirect_uri, &credentials)
        .await
        .map_err(|e| AppError::upstream("Failed to exchange authorization code", None, e))?;

    tracing::info!(
        expires_in = grant.expires_in,
        has_refresh_token = grant.refresh_token.is_some(),
        "Authorization code exchanged",
    );

    Ok(Json(grant))
}

/// GET /api/user-info
///
/// Look up the owner of the bearer token given in `Authorization`.
pub async fn user_info(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<UserInfoResponse>> {
    let api_key = state.api_key()?;

    let access_token = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            AppError::Unauthorized("Missing or invalid authorization header".into())
        })?;

    let profile = state
        .dispatcher
        .client()
        .memberships_for_current_user(access_token, api_key)
        .await
        .map_err(|e| AppError::upstream("Failed to get user information", None, e))?;

    Ok(Json(UserInfoResponse {
        bungie_net_user: profile.bungie_net_user,
        destiny_memberships: profile.destiny_memberships,
        primary_membership_id: profile.primary_membership_id,
        timestamp: state
            .clock
            .now()
            .to_rfc3339_opts(SecondsFormat::Millis, true),
    }))
}

/// `<Origin or https://Host>/oauth-callback.html`.
fn redirect_uri(headers: &HeaderMap) -> String {
    let header = |name: HeaderName| headers.get(name).and_then(|v| v.to_str().ok());

    let base = match (header(ORIGIN), header(HOST)) {
        (Some(origin), _) => origin.trim_end_matches('/').to_string(),
        (None, Some(host)) => format!("https://{host}"),
        (None, None) => String::new(),
    };
    format!("{base}{CALLBACK_PATH}")
}
