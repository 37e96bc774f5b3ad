//! Pass-through handlers for the platform API.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use vanguard_bungie::{BungieError, DispatchOutcome};

use crate::error::{AppError, AppResult};
use crate::middleware::session::verify_headers;
use crate::state::AppState;

const PROXY_FAILURE: &str = "Failed to fetch data from Bungie API";

/// Query string accepted by both proxy routes.
#[derive(Debug, Deserialize)]
pub struct ProxyQuery {
    /// Platform path, appended to `<base>/Platform`.
    pub endpoint: Option<String>,
}

impl ProxyQuery {
    fn endpoint(query: Result<Query<Self>, QueryRejection>) -> AppResult<String> {
        let Query(query) = query.map_err(|e| AppError::BadRequest(e.body_text()))?;
        query
            .endpoint
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| AppError::BadRequest("Endpoint parameter is required".into()))
    }
}

/// GET /api/bungie?endpoint=...
///
/// Forward with the application key only. The upstream body is returned as
/// long as it is JSON, whatever its envelope says.
pub async fn public_proxy(
    State(state): State<AppState>,
    query: Result<Query<ProxyQuery>, QueryRejection>,
) -> AppResult<Response> {
    let api_key = state.api_key()?;
    let endpoint = ProxyQuery::endpoint(query)?;

    let response = state
        .dispatcher
        .forward_anonymous(&endpoint, api_key)
        .await
        .and_then(|r| match serde_json::from_str::<serde_json::Value>(&r.body) {
            Ok(_) => Ok(r),
            Err(e) => Err(BungieError::InvalidBody(e.to_string())),
        })
        .map_err(|e| AppError::upstream(PROXY_FAILURE, Some(endpoint.clone()), e))?;

    Ok(json_passthrough(response.body))
}

/// GET /api/bungie-auth?endpoint=...
///
/// Forward on behalf of the session in the cookie, bearing its access token.
pub async fn authenticated_proxy(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<ProxyQuery>, QueryRejection>,
) -> AppResult<Response> {
    let codec = state.session_codec()?;
    let api_key = state.api_key()?;
    let endpoint = ProxyQuery::endpoint(query)?;

    let now = state.clock.now();
    let session = verify_headers(&headers, codec, now)?;

    let diagnostics = state.dispatcher.diagnostics();
    let outcome = state
        .dispatcher
        .dispatch(&session, &endpoint, api_key, now.timestamp_millis())
        .await
        .map_err(|e| AppError::upstream(PROXY_FAILURE, diagnostics.then(|| endpoint.clone()), e))?;

    match outcome {
        DispatchOutcome::Success { body } | DispatchOutcome::UpstreamError { body, .. } => {
            Ok(json_passthrough(body))
        }
        DispatchOutcome::AccessTokenExpired { fault } => Err(AppError::AccessTokenExpired {
            fault: diagnostics.then_some(fault),
        }),
    }
}

/// 200 carrying an upstream JSON body byte-for-byte.
fn json_passthrough(body: String) -> Response {
    (StatusCode::OK, [(CONTENT_TYPE, "application/json")], body).into_response()
}
