use vanguard_core::error::SessionError;
use vanguard_core::upstream::{ClassifyError, UpstreamFault};

/// Errors from the platform client and the proxy dispatcher.
#[derive(Debug, thiserror::Error)]
pub enum BungieError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The upstream answered with a body we could not interpret.
    #[error("Unreadable upstream response: {0}")]
    InvalidBody(String),

    /// The OAuth token endpoint refused the authorization code.
    #[error("Token exchange failed: {status}")]
    ExchangeFailed {
        status: u16,
        /// Raw response body for debugging; may be logged, never returned.
        body: String,
    },

    /// The platform returned a non-2xx status code.
    #[error("Bungie API returned HTTP {status}")]
    HttpStatus { status: u16, body: String },

    /// The platform envelope reported a failure.
    #[error("Bungie API Error: {}", .0.message.as_deref().unwrap_or("unknown error"))]
    Platform(UpstreamFault),

    #[error("Endpoint parameter is required")]
    MissingEndpoint,

    /// The session cannot be used for an upstream call.
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl BungieError {
    /// Whether this is a local or network fault rather than a caller or
    /// session problem.
    pub fn is_transport(&self) -> bool {
        matches!(self, BungieError::Request(_) | BungieError::InvalidBody(_))
    }
}

impl From<ClassifyError> for BungieError {
    fn from(err: ClassifyError) -> Self {
        BungieError::InvalidBody(err.to_string())
    }
}
