/// Failures of the session token codec itself.
///
/// These describe the token as a piece of signed data. Whether the upstream
/// credential inside a decodable token is still usable is a separate question
/// answered by [`SessionError`].
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("Session token signature is invalid")]
    InvalidSignature,

    #[error("Session token is malformed: {0}")]
    MalformedToken(String),

    #[error("Session token has expired")]
    Expired,

    #[error("Failed to encode session token: {0}")]
    Encode(String),
}

/// Why a session could not be issued or used.
///
/// Every rejection variant maps to a distinct caller-visible outcome; the
/// declaration order mirrors the order in which the verifier checks them.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("No session found")]
    NoSession,

    #[error("No session cookie found")]
    NoSessionCookie,

    #[error("Invalid session")]
    InvalidSession,

    #[error("Session expired")]
    SessionExpired,

    #[error("Session has no access token")]
    NoAccessToken,

    #[error("Profile is missing {0}")]
    MissingProfileData(&'static str),

    #[error(transparent)]
    Codec(#[from] CodecError),
}
