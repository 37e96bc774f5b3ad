//! Classification of platform response envelopes.
//!
//! The platform answers most calls with HTTP 200 and reports failure inside
//! the body:
//!
//! ```text
//! { "ErrorCode": 99, "ErrorStatus": "WebAuthRequired", "Message": "...", "Response": ... }
//! ```
//!
//! `ErrorCode == 1` is success. Which of the remaining codes mean "the bearer
//! credential is no longer accepted" is not exhaustively documented, so the
//! decision is driven by a configurable [`AuthFailureSignals`] set rather than
//! a fixed table.

use serde::Serialize;
use serde_json::Value;

/// The platform's internal success code.
pub const SUCCESS_CODE: i64 = 1;

/// Error details lifted from a non-success envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpstreamFault {
    pub code: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// What a platform envelope says about the call that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Success,
    /// The bearer credential was refused; the session itself may still verify.
    AccessTokenExpired(UpstreamFault),
    /// Any other platform-reported failure.
    UpstreamError(UpstreamFault),
}

#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
    #[error("Upstream response is not valid JSON: {0}")]
    NotJson(String),

    #[error("Upstream response has no numeric ErrorCode")]
    MissingErrorCode,
}

/// Signals that mark an envelope as an authorization failure.
///
/// Any single match is sufficient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthFailureSignals {
    pub codes: Vec<i64>,
    /// Compared case-insensitively against `ErrorStatus`.
    pub statuses: Vec<String>,
    /// Case-insensitive substrings of `Message`.
    pub message_keywords: Vec<String>,
}

impl Default for AuthFailureSignals {
    fn default() -> Self {
        Self {
            codes: vec![99, 2111, 2112],
            statuses: vec![
                "WebAuthRequired".to_string(),
                "AccessTokenHasExpired".to_string(),
                "AuthorizationCodeInvalid".to_string(),
            ],
            message_keywords: vec![
                "token".to_string(),
                "authorization".to_string(),
                "unauthorized".to_string(),
            ],
        }
    }
}

impl AuthFailureSignals {
    pub fn matches(&self, fault: &UpstreamFault) -> bool {
        if self.codes.contains(&fault.code) {
            return true;
        }

        if let Some(status) = fault.status.as_deref() {
            if self.statuses.iter().any(|s| s.eq_ignore_ascii_case(status)) {
                return true;
            }
        }

        if let Some(message) = fault.message.as_deref() {
            let message = message.to_lowercase();
            return self
                .message_keywords
                .iter()
                .filter(|k| !k.is_empty())
                .any(|k| message.contains(&k.to_lowercase()));
        }

        false
    }
}

/// Read the envelope fields out of a parsed body.
///
/// Returns `None` for a success envelope.
pub fn envelope_fault(body: &Value) -> Result<Option<UpstreamFault>, ClassifyError> {
    let code = body
        .get("ErrorCode")
        .and_then(Value::as_i64)
        .ok_or(ClassifyError::MissingErrorCode)?;

    if code == SUCCESS_CODE {
        return Ok(None);
    }

    let text = |key: &str| body.get(key).and_then(Value::as_str).map(str::to_owned);

    Ok(Some(UpstreamFault {
        code,
        status: text("ErrorStatus"),
        message: text("Message"),
    }))
}

pub fn classify(body: &Value, signals: &AuthFailureSignals) -> Result<Classification, ClassifyError> {
    Ok(match envelope_fault(body)? {
        None => Classification::Success,
        Some(fault) if signals.matches(&fault) => Classification::AccessTokenExpired(fault),
        Some(fault) => Classification::UpstreamError(fault),
    })
}

/// Parse a raw body and classify it.
pub fn classify_raw(raw: &str, signals: &AuthFailureSignals) -> Result<(Value, Classification), ClassifyError> {
    let body: Value = serde_json::from_str(raw).map_err(|e| ClassifyError::NotJson(e.to_string()))?;
    let classification = classify(&body, signals)?;
    Ok((body, classification))
}
