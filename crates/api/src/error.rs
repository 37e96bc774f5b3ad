use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{json, Map, Value};
use vanguard_bungie::BungieError;
use vanguard_core::error::SessionError;
use vanguard_core::upstream::UpstreamFault;

/// Application-level error type for HTTP handlers.
///
/// Implements [`IntoResponse`] to produce consistent JSON error responses of
/// the form `{ "error": ..., "code": ..., ["details": ...] }`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The local session is unusable (or could not be issued).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The session verified, but the platform refused its access token.
    #[error("Access token expired")]
    AccessTokenExpired {
        /// Present only when proxy diagnostics are enabled.
        fault: Option<UpstreamFault>,
    },

    /// A platform call failed; `context` is the caller-facing summary.
    #[error("{context}: {source}")]
    Upstream {
        context: &'static str,
        endpoint: Option<String>,
        source: BungieError,
    },

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// A required secret or credential is missing from the configuration.
    #[error("Configuration error: {0}")]
    Config(&'static str),

    #[error("Method not allowed")]
    MethodNotAllowed,
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn upstream(context: &'static str, endpoint: Option<String>, source: BungieError) -> Self {
        AppError::Upstream {
            context,
            endpoint,
            source,
        }
    }
}

impl From<BungieError> for AppError {
    fn from(err: BungieError) -> Self {
        AppError::upstream("Bungie API request failed", None, err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut extra = Map::new();

        let (status, code, message) = match self {
            AppError::Session(err) => session_error(err),

            AppError::AccessTokenExpired { fault } => {
                extra.insert("reauthenticate".into(), Value::Bool(true));
                if let Some(fault) = fault {
                    extra.insert("upstream".into(), json!(fault));
                }
                (
                    StatusCode::UNAUTHORIZED,
                    "ACCESS_TOKEN_EXPIRED",
                    "Access token expired".to_string(),
                )
            }

            AppError::Upstream {
                context,
                endpoint,
                source,
            } => match source {
                BungieError::Session(err) => session_error(err),
                BungieError::MissingEndpoint => (
                    StatusCode::BAD_REQUEST,
                    "BAD_REQUEST",
                    "Endpoint parameter is required".to_string(),
                ),
                source => {
                    let code = match &source {
                        BungieError::ExchangeFailed { status, body } => {
                            tracing::error!(status, body = %body, "Token exchange failed");
                            "EXCHANGE_FAILED"
                        }
                        e if e.is_transport() => {
                            tracing::error!(error = %e, endpoint = ?endpoint, "Upstream transport failure");
                            "TRANSPORT_ERROR"
                        }
                        e => {
                            tracing::error!(error = %e, endpoint = ?endpoint, "Upstream request failed");
                            "UPSTREAM_ERROR"
                        }
                    };
                    extra.insert("details".into(), Value::String(source.to_string()));
                    if let Some(endpoint) = endpoint {
                        extra.insert("endpoint".into(), Value::String(endpoint));
                    }
                    (StatusCode::INTERNAL_SERVER_ERROR, code, context.to_string())
                }
            },

            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg),
            AppError::Config(msg) => {
                tracing::error!(error = msg, "Server configuration error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CONFIG_ERROR",
                    msg.to_string(),
                )
            }
            AppError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                "METHOD_NOT_ALLOWED",
                "Method not allowed".to_string(),
            ),
        };

        let mut body = Map::new();
        body.insert("error".into(), Value::String(message));
        body.insert("code".into(), Value::String(code.to_string()));
        body.extend(extra);

        (status, axum::Json(Value::Object(body))).into_response()
    }
}

/// Map a session rejection to its status, error code, and message.
fn session_error(err: SessionError) -> (StatusCode, &'static str, String) {
    let code = match &err {
        SessionError::NoSession => "NO_SESSION",
        SessionError::NoSessionCookie => "NO_SESSION_COOKIE",
        SessionError::InvalidSession => "INVALID_SESSION",
        SessionError::SessionExpired => "SESSION_EXPIRED",
        SessionError::NoAccessToken => "NO_ACCESS_TOKEN",
        SessionError::MissingProfileData(_) => {
            return (StatusCode::BAD_REQUEST, "MISSING_PROFILE_DATA", err.to_string());
        }
        SessionError::Codec(codec) => {
            tracing::error!(error = %codec, "Session codec failure");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "Failed to create session".to_string(),
            );
        }
    };
    (StatusCode::UNAUTHORIZED, code, err.to_string())
}
