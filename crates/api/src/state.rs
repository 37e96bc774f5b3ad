use std::sync::Arc;
use std::time::Duration;

use vanguard_bungie::{BungieClient, BungieError, Dispatcher, OAuthCredentials};
use vanguard_core::clock::Clock;
use vanguard_core::session::codec::SessionCodec;

use crate::config::ServerConfig;
use crate::error::{AppError, AppResult};
use crate::registry::OptInRegistry;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`). Everything except
/// the opt-in registry is read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// `None` when `JWT_SECRET` is not configured.
    pub codec: Option<Arc<SessionCodec>>,
    pub dispatcher: Arc<Dispatcher>,
    pub clock: Arc<dyn Clock>,
    pub opt_ins: Arc<OptInRegistry>,
}

impl AppState {
    /// Build the state from configuration.
    ///
    /// Missing secrets do not fail here; each request that needs one reports
    /// the gap itself.
    pub fn new(config: ServerConfig, clock: Arc<dyn Clock>) -> Result<Self, BungieError> {
        let codec = config.session.secret.as_ref().map(|secret| {
            Arc::new(SessionCodec::new(
                secret.expose(),
                chrono::Duration::days(config.session.ttl_days),
            ))
        });

        let client = BungieClient::new(
            config.bungie.base_url.clone(),
            Duration::from_secs(config.bungie.timeout_secs),
        )?;
        let dispatcher = Dispatcher::new(client, config.auth_failure_signals.clone())
            .with_diagnostics(config.proxy_diagnostics);

        Ok(Self {
            config: Arc::new(config),
            codec,
            dispatcher: Arc::new(dispatcher),
            clock,
            opt_ins: Arc::new(OptInRegistry::new()),
        })
    }

    pub fn session_codec(&self) -> AppResult<&SessionCodec> {
        self.codec
            .as_deref()
            .ok_or(AppError::Config("JWT secret not configured"))
    }

    pub fn api_key(&self) -> AppResult<&str> {
        self.config
            .bungie
            .api_key
            .as_ref()
            .map(|key| key.expose())
            .ok_or(AppError::Config("API key not configured"))
    }

    pub fn client_id(&self) -> AppResult<&str> {
        self.config
            .bungie
            .client_id
            .as_deref()
            .ok_or(AppError::Config("OAuth client ID not configured"))
    }

    pub fn oauth_credentials(&self) -> AppResult<OAuthCredentials> {
        let bungie = &self.config.bungie;
        match (&bungie.client_id, &bungie.client_secret) {
            (Some(client_id), Some(client_secret)) => Ok(OAuthCredentials {
                client_id: client_id.clone(),
                client_secret: client_secret.expose().to_string(),
            }),
            _ => Err(AppError::Config("OAuth credentials not configured")),
        }
    }
}
