//! The self-contained user session and the types it is minted from.
//!
//! - [`codec`] -- signs and verifies the session token.
//! - [`issuer`] -- builds a session from an OAuth grant plus a user profile.
//! - [`verifier`] -- turns an inbound `Cookie` header into a usable session.

pub mod codec;
pub mod issuer;
pub mod verifier;

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::SessionError;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "session";

/// A platform account linked to the authenticated principal.
///
/// Only `membershipId` and `membershipType` are interpreted; every other field
/// the platform sends is carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinyMembership {
    pub membership_id: String,
    #[serde(default)]
    pub membership_type: i32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Server-trusted state embedded in the signed session token.
///
/// Immutable once issued: re-authenticating produces a wholly new session.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_id: String,
    /// For display and logs only, never for authorization.
    pub display_name: String,
    pub destiny_memberships: Vec<DestinyMembership>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Milliseconds since the epoch after which `access_token` is stale.
    pub token_expiry: i64,
    /// Milliseconds since the epoch.
    pub created_at: i64,
}

impl Session {
    /// Semantic checks applied after the token itself has been verified.
    ///
    /// Returns the upstream access token when the session may be used for a
    /// proxied call.
    pub fn ensure_usable(&self, now_millis: i64) -> Result<&str, SessionError> {
        if now_millis >= self.token_expiry {
            return Err(SessionError::SessionExpired);
        }

        match self.access_token.as_deref() {
            Some(token) if !token.is_empty() => Ok(token),
            _ => Err(SessionError::NoAccessToken),
        }
    }

    /// The subset of the session that is safe to hand back to the browser.
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            user_id: self.user_id.clone(),
            display_name: self.display_name.clone(),
            destiny_memberships: self.destiny_memberships.clone(),
            created_at: self.created_at,
        }
    }

    pub fn membership_ids(&self) -> Vec<String> {
        self.destiny_memberships
            .iter()
            .map(|m| m.membership_id.clone())
            .collect()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .field("display_name", &self.display_name)
            .field("destiny_memberships", &self.destiny_memberships.len())
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("token_expiry", &self.token_expiry)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Session check response body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub user_id: String,
    pub display_name: String,
    pub destiny_memberships: Vec<DestinyMembership>,
    pub created_at: i64,
}

/// Public user summary returned when a session is issued.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub display_name: String,
    pub membership_id: String,
    pub destiny_memberships: Vec<DestinyMembership>,
}

/// Tokens returned by the upstream OAuth token endpoint.
///
/// Fields the platform adds beyond the standard ones are kept in `extra` so
/// the payload can be relayed to the caller unchanged.
#[derive(Clone, Serialize, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Lifetime of `access_token` in seconds.
    pub expires_in: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_expires_in: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub membership_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl fmt::Debug for TokenGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenGrant")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("expires_in", &self.expires_in)
            .field("token_type", &self.token_type)
            .field("membership_id", &self.membership_id)
            .finish()
    }
}

/// The platform account record of the authenticated principal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub membership_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// User profile as fetched from the platform after the OAuth exchange.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bungie_net_user: Option<PlatformUser>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destiny_memberships: Option<Vec<DestinyMembership>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_membership_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}


#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::test_support::session;
    use super::*;

    #[test]
    fn usable_session_yields_access_token() {
        let s = session(10_000);
        assert_eq!(s.ensure_usable(9_999).unwrap(), "access-abc");
    }

    #[test]
    fn stale_token_expiry_is_session_expired() {
        let s = session(10_000);
        assert_matches!(s.ensure_usable(10_000), Err(SessionError::SessionExpired));
        assert_matches!(s.ensure_usable(20_000), Err(SessionError::SessionExpired));
    }

    #[test]
    fn missing_or_empty_access_token_is_rejected() {
        let mut s = session(10_000);
        s.access_token = None;
        assert_matches!(s.ensure_usable(0), Err(SessionError::NoAccessToken));

        s.access_token = Some(String::new());
        assert_matches!(s.ensure_usable(0), Err(SessionError::NoAccessToken));
    }

    #[test]
    fn debug_output_redacts_credentials() {
        let rendered = format!("{:?}", session(10_000));
        assert!(!rendered.contains("access-abc"));
        assert!(!rendered.contains("refresh-xyz"));
        assert!(rendered.contains("Osiris"));
    }

    #[test]
    fn summary_omits_credentials() {
        let json = serde_json::to_value(session(10_000).summary()).unwrap();
        assert!(json.get("accessToken").is_none());
        assert_eq!(json["displayName"], "Osiris");
        assert_eq!(json["destinyMemberships"][0]["membershipType"], 3);
    }

    #[test]
    fn membership_extra_fields_survive_serde() {
        let raw = serde_json::json!({
            "membershipId": "1",
            "membershipType": 2,
            "displayName": "Guardian",
            "crossSaveOverride": 0
        });
        let m: DestinyMembership = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(m.extra["displayName"], "Guardian");
        assert_eq!(serde_json::to_value(&m).unwrap(), raw);
    }
}
