//! HS256 session tokens.
//!
//! A token is a JWT whose claims are the [`Session`] fields plus the standard
//! `iat`/`exp` pair. The codec-level `exp` bounds the life of the token itself
//! and is unrelated to [`Session::token_expiry`], which tracks the upstream
//! credential.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::Session;
use crate::error::CodecError;

/// Default codec-level lifetime of a session token.
pub const DEFAULT_SESSION_TTL_DAYS: i64 = 7;

#[derive(Serialize, Deserialize)]
struct SessionClaims {
    #[serde(flatten)]
    session: Session,
    iat: i64,
    exp: i64,
}

/// Signs and verifies session tokens with a shared secret.
#[derive(Clone)]
pub struct SessionCodec {
    secret: String,
    ttl: Duration,
}

impl SessionCodec {
    pub fn new(secret: impl Into<String>, ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            ttl,
        }
    }

    /// Lifetime embedded in every token this codec issues.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign `session`, stamping `iat = now` and `exp = now + ttl`.
    pub fn encode(&self, session: &Session, now: DateTime<Utc>) -> Result<String, CodecError> {
        let claims = SessionClaims {
            session: session.clone(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| CodecError::Encode(e.to_string()))
    }

    /// Verify the signature and codec-level expiry of `token` as of `now`.
    ///
    /// The `exp` claim is checked here against the supplied time (no leeway)
    /// rather than by `jsonwebtoken`, which would consult the system clock.
    pub fn decode(&self, token: &str, now: DateTime<Utc>) -> Result<Session, CodecError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        let data = decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(classify_jwt_error)?;

        if now.timestamp() >= data.claims.exp {
            return Err(CodecError::Expired);
        }

        Ok(data.claims.session)
    }
}

impl fmt::Debug for SessionCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCodec")
            .field("secret", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}

fn classify_jwt_error(err: jsonwebtoken::errors::Error) -> CodecError {
    match err.kind() {
        ErrorKind::InvalidSignature => CodecError::InvalidSignature,
        ErrorKind::ExpiredSignature => CodecError::Expired,
        _ => CodecError::MalformedToken(err.to_string()),
    }
}
