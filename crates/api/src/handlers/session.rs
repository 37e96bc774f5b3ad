//! Handlers for issuing, checking, and clearing the session cookie.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use vanguard_core::session::issuer::issue;
use vanguard_core::session::{PublicUser, SessionSummary, TokenGrant, UserProfile};

use crate::cookies::{clear_session_cookie, session_cookie};
use crate::error::{AppError, AppResult};
use crate::middleware::session::SessionUser;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /api/create-session`.
///
/// Both halves are kept loose here so a missing half is a 400 and not a
/// deserialization rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub token_data: Option<Value>,
    pub user_info: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub success: bool,
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub success: bool,
    pub message: &'static str,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/create-session
///
/// Sign a session from the exchanged tokens and fetched profile, and hand it
/// to the browser as an HttpOnly cookie.
pub async fn create_session(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Result<Json<CreateSessionRequest>, JsonRejection>,
) -> AppResult<(CookieJar, Json<CreateSessionResponse>)> {
    let codec = state.session_codec()?;

    let input = body.map(|Json(input)| input).unwrap_or_default();
    let (Some(token_data), Some(user_info)) = (input.token_data, input.user_info) else {
        return Err(AppError::BadRequest(
            "Missing token data or user info".into(),
        ));
    };

    let grant: TokenGrant = serde_json::from_value(token_data)
        .map_err(|e| AppError::BadRequest(format!("Invalid token data: {e}")))?;
    let profile: UserProfile = serde_json::from_value(user_info)
        .map_err(|e| AppError::BadRequest(format!("Invalid user info: {e}")))?;

    let issued = issue(codec, &grant, &profile, state.clock.now())?;

    tracing::info!(
        user = %issued.user.display_name,
        memberships = issued.user.destiny_memberships.len(),
        "Session created",
    );

    let jar = jar.add(session_cookie(issued.token, codec.ttl()));
    Ok((
        jar,
        Json(CreateSessionResponse {
            success: true,
            user: issued.user,
        }),
    ))
}

/// GET /api/check-session
///
/// Return the non-secret part of the caller's session.
pub async fn check_session(SessionUser(session): SessionUser) -> Json<SessionSummary> {
    Json(session.summary())
}

/// POST /api/logout
///
/// Clears the cookie only; the token itself stays valid until it expires.
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<LogoutResponse>) {
    (
        jar.add(clear_session_cookie()),
        Json(LogoutResponse {
            success: true,
            message: "Logged out successfully",
        }),
    )
}
