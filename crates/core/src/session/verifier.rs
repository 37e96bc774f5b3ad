//! Turns an inbound `Cookie` header into a usable [`Session`].
//!
//! Checks run in a fixed order, structural before semantic, so malformed
//! input never reaches the expiry or credential checks:
//!
//! 1. no `Cookie` header            -> [`SessionError::NoSession`]
//! 2. no `session=` entry           -> [`SessionError::NoSessionCookie`]
//! 3. bad signature or format       -> [`SessionError::InvalidSession`]
//! 4. codec-level expiry elapsed    -> [`SessionError::SessionExpired`]
//! 5. `tokenExpiry` elapsed         -> [`SessionError::SessionExpired`]
//! 6. no upstream access token      -> [`SessionError::NoAccessToken`]

use chrono::{DateTime, Utc};

use super::codec::SessionCodec;
use super::{Session, SESSION_COOKIE};
use crate::error::{CodecError, SessionError};

/// Locate the raw session token inside a `Cookie` header value.
pub fn session_token(cookie_header: Option<&str>) -> Result<&str, SessionError> {
    let header = cookie_header.ok_or(SessionError::NoSession)?;

    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| name.trim() == SESSION_COOKIE)
        .map(|(_, value)| value.trim())
        .ok_or(SessionError::NoSessionCookie)
}

/// Validate the session carried by `cookie_header` as of `now`.
pub fn verify(
    cookie_header: Option<&str>,
    codec: &SessionCodec,
    now: DateTime<Utc>,
) -> Result<Session, SessionError> {
    let token = session_token(cookie_header)?;

    let session = codec.decode(token, now).map_err(|e| match e {
        CodecError::Expired => SessionError::SessionExpired,
        CodecError::InvalidSignature | CodecError::MalformedToken(_) | CodecError::Encode(_) => {
            SessionError::InvalidSession
        }
    })?;

    session.ensure_usable(now.timestamp_millis())?;
    Ok(session)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::Duration;

    use super::*;
    use crate::session::test_support::session;

    fn codec() -> SessionCodec {
        SessionCodec::new("verifier-secret", Duration::days(7))
    }

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn cookie_for(s: &Session) -> String {
        let token = codec().encode(s, now()).unwrap();
        format!("theme=dark; session={token}; lang=en")
    }

    #[test]
    fn finds_session_among_other_cookies() {
        assert_eq!(session_token(Some("a=1; session=tok; b=2")).unwrap(), "tok");
        assert_eq!(session_token(Some("session=tok")).unwrap(), "tok");
    }

    #[test]
    fn does_not_match_cookie_with_session_prefix() {
        assert_matches!(
            session_token(Some("session_id=abc; sessionx=1")),
            Err(SessionError::NoSessionCookie)
        );
    }

    #[test]
    fn missing_header_is_no_session() {
        assert_matches!(verify(None, &codec(), now()), Err(SessionError::NoSession));
    }

    #[test]
    fn header_without_session_entry_is_no_session_cookie() {
        assert_matches!(
            verify(Some("theme=dark"), &codec(), now()),
            Err(SessionError::NoSessionCookie)
        );
        assert_matches!(verify(Some(""), &codec(), now()), Err(SessionError::NoSessionCookie));
    }

    #[test]
    fn bad_token_is_invalid_session() {
        assert_matches!(
            verify(Some("session=garbage"), &codec(), now()),
            Err(SessionError::InvalidSession)
        );
        assert_matches!(verify(Some("session="), &codec(), now()), Err(SessionError::InvalidSession));
    }

    #[test]
    fn foreign_signature_is_invalid_session() {
        let s = session(now().timestamp_millis() + 60_000);
        let foreign = SessionCodec::new("someone-else", Duration::days(7))
            .encode(&s, now())
            .unwrap();
        let header = format!("session={foreign}");
        assert_matches!(
            verify(Some(&header), &codec(), now()),
            Err(SessionError::InvalidSession)
        );
    }

    #[test]
    fn codec_expiry_is_session_expired() {
        let s = session(i64::MAX);
        let header = cookie_for(&s);
        let later = now() + Duration::days(8);
        assert_matches!(verify(Some(&header), &codec(), later), Err(SessionError::SessionExpired));
    }

    #[test]
    fn stale_upstream_token_is_session_expired_despite_valid_signature() {
        let s = session(now().timestamp_millis() - 1);
        let header = cookie_for(&s);
        assert_matches!(verify(Some(&header), &codec(), now()), Err(SessionError::SessionExpired));
    }

    #[test]
    fn missing_access_token_is_reported() {
        let mut s = session(now().timestamp_millis() + 60_000);
        s.access_token = None;
        let header = cookie_for(&s);
        assert_matches!(verify(Some(&header), &codec(), now()), Err(SessionError::NoAccessToken));
    }

    #[test]
    fn valid_cookie_yields_session() {
        let s = session(now().timestamp_millis() + 60_000);
        let header = cookie_for(&s);
        assert_eq!(verify(Some(&header), &codec(), now()).unwrap(), s);
    }
}
