//! Mints a session from a completed OAuth exchange.

use chrono::{DateTime, Utc};

use super::codec::SessionCodec;
use super::{PublicUser, Session, TokenGrant, UserProfile};
use crate::error::SessionError;

/// A freshly signed session together with what the browser may see of it.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    /// Signed token destined for the `session` cookie.
    pub token: String,
    /// Never contains the upstream credentials.
    pub user: PublicUser,
    pub session: Session,
}

/// Build and sign a session from an OAuth grant and the matching profile.
///
/// The profile must name the principal and list its memberships; a session
/// lacking either is useless to the proxy and is refused up front.
pub fn issue(
    codec: &SessionCodec,
    grant: &TokenGrant,
    profile: &UserProfile,
    now: DateTime<Utc>,
) -> Result<IssuedSession, SessionError> {
    let account = profile
        .bungie_net_user
        .as_ref()
        .ok_or(SessionError::MissingProfileData("bungieNetUser"))?;

    let user_id = account
        .membership_id
        .clone()
        .filter(|id| !id.is_empty())
        .ok_or(SessionError::MissingProfileData("bungieNetUser.membershipId"))?;

    let destiny_memberships = profile
        .destiny_memberships
        .clone()
        .ok_or(SessionError::MissingProfileData("destinyMemberships"))?;

    let display_name = account.display_name.clone().unwrap_or_default();
    let now_millis = now.timestamp_millis();

    let session = Session {
        user_id: user_id.clone(),
        display_name: display_name.clone(),
        destiny_memberships: destiny_memberships.clone(),
        access_token: Some(grant.access_token.clone()),
        refresh_token: grant.refresh_token.clone(),
        token_expiry: now_millis.saturating_add(grant.expires_in.saturating_mul(1000)),
        created_at: now_millis,
    };

    let token = codec.encode(&session, now)?;

    Ok(IssuedSession {
        token,
        user: PublicUser {
            display_name,
            membership_id: user_id,
            destiny_memberships,
        },
        session,
    })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::Duration;
    use serde_json::json;

    use super::*;

    fn codec() -> SessionCodec {
        SessionCodec::new("issuer-secret", Duration::days(7))
    }

    fn grant(expires_in: i64) -> TokenGrant {
        serde_json::from_value(json!({
            "access_token": "upstream-access",
            "refresh_token": "upstream-refresh",
            "expires_in": expires_in,
            "token_type": "Bearer",
            "membership_id": "1234"
        }))
        .unwrap()
    }

    fn profile() -> UserProfile {
        serde_json::from_value(json!({
            "bungieNetUser": { "membershipId": "1234", "displayName": "Saint-14" },
            "destinyMemberships": [
                { "membershipId": "4611686018429701520", "membershipType": 3 },
                { "membershipId": "4611686018467284386", "membershipType": 1 }
            ]
        }))
        .unwrap()
    }

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn issue_sets_expiry_and_creation_time() {
        let issued = issue(&codec(), &grant(3600), &profile(), now()).unwrap();

        let s = &issued.session;
        assert_eq!(s.user_id, "1234");
        assert_eq!(s.display_name, "Saint-14");
        assert_eq!(s.created_at, now().timestamp_millis());
        assert_eq!(s.token_expiry, now().timestamp_millis() + 3_600_000);
        assert_eq!(s.access_token.as_deref(), Some("upstream-access"));
        assert_eq!(s.destiny_memberships.len(), 2);
    }

    #[test]
    fn issued_token_decodes_to_the_same_session() {
        let codec = codec();
        let issued = issue(&codec, &grant(3600), &profile(), now()).unwrap();
        assert_eq!(codec.decode(&issued.token, now()).unwrap(), issued.session);
    }

    #[test]
    fn public_user_never_carries_credentials() {
        let issued = issue(&codec(), &grant(3600), &profile(), now()).unwrap();
        let json = serde_json::to_value(&issued.user).unwrap();

        assert_eq!(json["displayName"], "Saint-14");
        assert_eq!(json["membershipId"], "1234");
        assert!(!json.to_string().contains("upstream-access"));
        assert!(!json.to_string().contains("upstream-refresh"));
    }

    #[test]
    fn missing_principal_is_rejected() {
        let mut p = profile();
        p.bungie_net_user = None;
        assert_matches!(
            issue(&codec(), &grant(3600), &p, now()),
            Err(SessionError::MissingProfileData("bungieNetUser"))
        );

        let mut p = profile();
        if let Some(user) = p.bungie_net_user.as_mut() {
            user.membership_id = None;
        }
        assert_matches!(
            issue(&codec(), &grant(3600), &p, now()),
            Err(SessionError::MissingProfileData(_))
        );
    }

    #[test]
    fn missing_membership_list_is_rejected() {
        let mut p = profile();
        p.destiny_memberships = None;
        assert_matches!(
            issue(&codec(), &grant(3600), &p, now()),
            Err(SessionError::MissingProfileData("destinyMemberships"))
        );
    }

    #[test]
    fn empty_membership_list_is_allowed() {
        let mut p = profile();
        p.destiny_memberships = Some(Vec::new());
        let issued = issue(&codec(), &grant(3600), &p, now()).unwrap();
        assert!(issued.user.destiny_memberships.is_empty());
    }
}
