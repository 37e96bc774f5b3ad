//! Session-cookie extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use vanguard_core::error::SessionError;
use vanguard_core::session::codec::SessionCodec;
use vanguard_core::session::verifier::verify;
use vanguard_core::session::Session;

use crate::error::AppError;
use crate::state::AppState;

/// Session verified from the `session` cookie of the incoming request.
///
/// Use this as an extractor parameter in any handler that requires a
/// signed-in user:
///
/// ```ignore
/// async fn my_handler(SessionUser(session): SessionUser) -> AppResult<Json<()>> {
///     tracing::info!(user = %session.display_name, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct SessionUser(pub Session);

impl FromRequestParts<AppState> for SessionUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let codec = state.session_codec()?;
        let session = verify_headers(&parts.headers, codec, state.clock.now())?;
        Ok(SessionUser(session))
    }
}

/// Verify the session carried by the request's `Cookie` header(s).
///
/// HTTP/2 clients may split cookies over several headers; they are joined
/// back into one list before lookup.
pub fn verify_headers(
    headers: &HeaderMap,
    codec: &SessionCodec,
    now: DateTime<Utc>,
) -> Result<Session, SessionError> {
    if !headers.contains_key(COOKIE) {
        return verify(None, codec, now);
    }

    // Non-UTF-8 values cannot hold a session entry; they are skipped, which
    // leaves an empty list when nothing else is present.
    let cookies: Vec<&str> = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();

    verify(Some(&cookies.join("; ")), codec, now)
}
