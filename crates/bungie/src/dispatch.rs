//! The authenticated proxy dispatcher.
//!
//! Executes one platform call on behalf of a verified session and decides what
//! the envelope means for that session. The three outcomes a client needs to
//! branch on are kept apart:
//!
//! - the session itself is unusable ([`BungieError::Session`]),
//! - the upstream credential inside it is stale ([`DispatchOutcome::AccessTokenExpired`]),
//! - the platform call failed for its own reasons ([`DispatchOutcome::UpstreamError`]).

use vanguard_core::session::Session;
use vanguard_core::upstream::{classify_raw, AuthFailureSignals, Classification, UpstreamFault};

use crate::client::{BungieClient, UpstreamResponse};
use crate::error::BungieError;

/// Result of a dispatched call that reached the platform and was understood.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Envelope reported success; `body` is the upstream body, verbatim.
    Success { body: String },
    /// The platform refused the session's bearer credential.
    AccessTokenExpired { fault: UpstreamFault },
    /// Any other platform failure; `body` is forwarded for the client to render.
    UpstreamError { fault: UpstreamFault, body: String },
}

/// Forwards platform calls and classifies their envelopes.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    client: BungieClient,
    signals: AuthFailureSignals,
    diagnostics: bool,
}

impl Dispatcher {
    pub fn new(client: BungieClient, signals: AuthFailureSignals) -> Self {
        Self {
            client,
            signals,
            diagnostics: false,
        }
    }

    /// Log every upstream envelope and expose fault detail to callers.
    pub fn with_diagnostics(mut self, enabled: bool) -> Self {
        self.diagnostics = enabled;
        self
    }

    pub fn diagnostics(&self) -> bool {
        self.diagnostics
    }

    pub fn client(&self) -> &BungieClient {
        &self.client
    }

    /// Call `endpoint` with the session's access token as bearer credential.
    ///
    /// All precondition failures (empty path, stale `tokenExpiry`, missing
    /// access token) are reported before any network traffic.
    pub async fn dispatch(
        &self,
        session: &Session,
        endpoint: &str,
        api_key: &str,
        now_millis: i64,
    ) -> Result<DispatchOutcome, BungieError> {
        if endpoint.trim().is_empty() {
            return Err(BungieError::MissingEndpoint);
        }

        let access_token = session.ensure_usable(now_millis)?;

        tracing::debug!(endpoint, user = %session.display_name, "Dispatching authenticated request");

        let response = self
            .client
            .get(endpoint, api_key, Some(access_token))
            .await
            .inspect_err(|e| tracing::error!(endpoint, error = %e, "Authenticated request failed"))?;

        let (_, classification) = classify_raw(&response.body, &self.signals).map_err(|e| {
            tracing::error!(endpoint, status = response.status, error = %e, "Unreadable upstream body");
            BungieError::from(e)
        })?;

        let outcome = match classification {
            Classification::Success => DispatchOutcome::Success {
                body: response.body,
            },
            Classification::AccessTokenExpired(fault) => {
                DispatchOutcome::AccessTokenExpired { fault }
            }
            Classification::UpstreamError(fault) => DispatchOutcome::UpstreamError {
                fault,
                body: response.body,
            },
        };

        self.log_outcome(endpoint, response.status, &outcome);
        Ok(outcome)
    }

    /// Call `endpoint` with the application key only, returning the raw answer.
    ///
    /// Nothing is classified or rejected on the way back; the envelope is only
    /// inspected for logging when diagnostics are on.
    pub async fn forward_anonymous(
        &self,
        endpoint: &str,
        api_key: &str,
    ) -> Result<UpstreamResponse, BungieError> {
        if endpoint.trim().is_empty() {
            return Err(BungieError::MissingEndpoint);
        }

        let response = self.client.get(endpoint, api_key, None).await?;

        if self.diagnostics {
            match classify_raw(&response.body, &self.signals) {
                Ok((_, Classification::Success)) => {
                    tracing::info!(endpoint, status = response.status, "Bungie API success");
                }
                Ok((_, Classification::AccessTokenExpired(fault) | Classification::UpstreamError(fault))) => {
                    tracing::info!(
                        endpoint,
                        error_code = fault.code,
                        error_status = ?fault.status,
                        message = ?fault.message,
                        "Bungie API error response"
                    );
                }
                Err(e) => tracing::warn!(endpoint, error = %e, "Unclassifiable Bungie API response"),
            }
        }

        Ok(response)
    }

    fn log_outcome(&self, endpoint: &str, status: u16, outcome: &DispatchOutcome) {
        if !self.diagnostics {
            tracing::debug!(endpoint, status, outcome = outcome.label(), "Upstream call classified");
            return;
        }

        match outcome {
            DispatchOutcome::Success { body } => {
                tracing::info!(endpoint, status, bytes = body.len(), "Bungie API success");
            }
            DispatchOutcome::AccessTokenExpired { fault } | DispatchOutcome::UpstreamError { fault, .. } => {
                tracing::info!(
                    endpoint,
                    status,
                    outcome = outcome.label(),
                    error_code = fault.code,
                    error_status = ?fault.status,
                    message = ?fault.message,
                    "Bungie API error response"
                );
            }
        }
    }
}

impl DispatchOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            DispatchOutcome::Success { .. } => "success",
            DispatchOutcome::AccessTokenExpired { .. } => "access_token_expired",
            DispatchOutcome::UpstreamError { .. } => "upstream_error",
        }
    }
}
