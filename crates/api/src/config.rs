use std::fmt;

use vanguard_bungie::client::DEFAULT_BASE_URL;
use vanguard_core::session::codec::DEFAULT_SESSION_TTL_DAYS;
use vanguard_core::upstream::AuthFailureSignals;

/// Scope requested from the platform's authorization page.
pub const DEFAULT_OAUTH_SCOPE: &str = "ReadUserData,ReadDestinyInventoryAndVault";

/// Upper bound on `SESSION_TTL_DAYS` (ten years).
const MAX_SESSION_TTL_DAYS: i64 = 3650;

/// A configuration value that must never appear in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be a valid {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Session signing settings.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// HMAC secret for session tokens. Missing is tolerated at startup and
    /// reported as a 500 on every request that needs it.
    pub secret: Option<Secret>,
    /// Codec-level token lifetime and cookie `Max-Age`, in days.
    pub ttl_days: i64,
}

/// Upstream platform settings.
#[derive(Debug, Clone)]
pub struct BungieConfig {
    pub api_key: Option<Secret>,
    pub client_id: Option<String>,
    pub client_secret: Option<Secret>,
    pub base_url: String,
    pub oauth_scope: String,
    /// Bound on every outbound call, in seconds.
    pub timeout_secs: u64,
}

/// Server configuration loaded from environment variables.
///
/// Loaded once at startup and shared read-only between requests.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Inbound request timeout in seconds.
    pub request_timeout_secs: u64,
    pub session: SessionConfig,
    pub bungie: BungieConfig,
    /// Log every upstream envelope and include fault detail in error bodies.
    pub proxy_diagnostics: bool,
    pub auth_failure_signals: AuthFailureSignals,
}

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                 | Default                                   |
    /// |-------------------------|-------------------------------------------|
    /// | `HOST`                  | `0.0.0.0`                                 |
    /// | `PORT`                  | `3000`                                    |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                                      |
    /// | `UPSTREAM_TIMEOUT_SECS` | `10`                                      |
    /// | `JWT_SECRET`            | --                                        |
    /// | `SESSION_TTL_DAYS`      | `7`                                       |
    /// | `BUNGIE_API_KEY`        | --                                        |
    /// | `BUNGIE_CLIENT_ID`      | --                                        |
    /// | `BUNGIE_CLIENT_SECRET`  | --                                        |
    /// | `BUNGIE_BASE_URL`       | `https://www.bungie.net`                  |
    /// | `OAUTH_SCOPE`           | `ReadUserData,ReadDestinyInventoryAndVault` |
    /// | `PROXY_DIAGNOSTICS`     | `false`                                   |
    /// | `AUTH_FAILURE_CODES`    | `99,2111,2112`                            |
    /// | `AUTH_FAILURE_STATUSES` | `WebAuthRequired,AccessTokenHasExpired,AuthorizationCodeInvalid` |
    /// | `AUTH_FAILURE_KEYWORDS` | `token,authorization,unauthorized`        |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());
        let optional = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let defaults = AuthFailureSignals::default();
        let auth_failure_signals = AuthFailureSignals {
            codes: match lookup("AUTH_FAILURE_CODES") {
                Some(raw) => split_list(&raw)
                    .into_iter()
                    .map(|code| {
                        code.parse().map_err(|_| ConfigError::Invalid {
                            name: "AUTH_FAILURE_CODES",
                            expected: "comma-separated list of integers",
                            value: raw.clone(),
                        })
                    })
                    .collect::<Result<_, _>>()?,
                None => defaults.codes,
            },
            statuses: lookup("AUTH_FAILURE_STATUSES")
                .map(|raw| split_list(&raw))
                .unwrap_or(defaults.statuses),
            message_keywords: lookup("AUTH_FAILURE_KEYWORDS")
                .map(|raw| split_list(&raw))
                .unwrap_or(defaults.message_keywords),
        };

        Ok(Self {
            host: text("HOST", "0.0.0.0"),
            port: parse("PORT", &text("PORT", "3000"), "u16")?,
            request_timeout_secs: parse(
                "REQUEST_TIMEOUT_SECS",
                &text("REQUEST_TIMEOUT_SECS", "30"),
                "u64",
            )?,
            session: SessionConfig {
                secret: optional("JWT_SECRET").map(Secret::new),
                ttl_days: parse_ttl_days(&text(
                    "SESSION_TTL_DAYS",
                    &DEFAULT_SESSION_TTL_DAYS.to_string(),
                ))?,
            },
            bungie: BungieConfig {
                api_key: optional("BUNGIE_API_KEY").map(Secret::new),
                client_id: optional("BUNGIE_CLIENT_ID"),
                client_secret: optional("BUNGIE_CLIENT_SECRET").map(Secret::new),
                base_url: text("BUNGIE_BASE_URL", DEFAULT_BASE_URL),
                oauth_scope: text("OAUTH_SCOPE", DEFAULT_OAUTH_SCOPE),
                timeout_secs: parse(
                    "UPSTREAM_TIMEOUT_SECS",
                    &text("UPSTREAM_TIMEOUT_SECS", "10"),
                    "u64",
                )?,
            },
            proxy_diagnostics: parse_bool("PROXY_DIAGNOSTICS", lookup("PROXY_DIAGNOSTICS"))?,
            auth_failure_signals,
        })
    }
}

fn parse<T: std::str::FromStr>(
    name: &'static str,
    value: &str,
    expected: &'static str,
) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        expected,
        value: value.to_string(),
    })
}

/// Session lifetime in days, bounded so the expiry arithmetic cannot overflow.
fn parse_ttl_days(value: &str) -> Result<i64, ConfigError> {
    parse::<i64>("SESSION_TTL_DAYS", value, "number of days between 1 and 3650")
        .ok()
        .filter(|days| (1..=MAX_SESSION_TTL_DAYS).contains(days))
        .ok_or_else(|| ConfigError::Invalid {
            name: "SESSION_TTL_DAYS",
            expected: "number of days between 1 and 3650",
            value: value.to_string(),
        })
}

fn parse_bool(name: &'static str, value: Option<String>) -> Result<bool, ConfigError> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(false),
        Some(v) if v.eq_ignore_ascii_case("true") || v == "1" => Ok(true),
        Some(v) if v.eq_ignore_ascii_case("false") || v == "0" => Ok(false),
        Some(v) => Err(ConfigError::Invalid {
            name,
            expected: "boolean",
            value: v.to_string(),
        }),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
