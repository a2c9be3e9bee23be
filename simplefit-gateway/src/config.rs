//! Process-wide gateway configuration, read once at startup.

use std::{fmt, time::Duration};

use axum::http::{HeaderValue, Uri};

/// Upstream exercise API base URL.
pub const ENV_API_URL: &str = "API_URL";
/// Shared HMAC secret for session validation and credential signing.
pub const ENV_AUTH_SECRET: &str = "AUTH_SECRET";
pub const ENV_LISTEN_ADDR: &str = "SIMPLEFIT_LISTEN_ADDR";
pub const ENV_ALLOWED_ORIGINS: &str = "SIMPLEFIT_ALLOWED_ORIGINS";
pub const ENV_UPSTREAM_TIMEOUT_SECS: &str = "SIMPLEFIT_UPSTREAM_TIMEOUT_SECS";
pub const ENV_GOOGLE_CLIENT_ID: &str = "GOOGLE_CLIENT_ID";
pub const ENV_GOOGLE_CLIENT_SECRET: &str = "GOOGLE_CLIENT_SECRET";

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:3000";
pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors raised while building a [`GatewayConfig`]. All of them are fatal.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// A required variable is unset or empty.
    #[error("{key} must be set")]
    Missing { key: &'static str },

    /// A variable is set but its value cannot be used.
    #[error("invalid {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Secret bytes whose `Debug` output never shows the value.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(Vec<u8>);

impl Secret {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}

/// OAuth client credentials for the delegated sign-in flow.
///
/// The proxy path never reads these; they are carried so a single
/// environment describes the whole deployment.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct IdentityProviderConfig {
    pub client_id: String,
    pub client_secret: Secret,
}

/// Gateway configuration.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct GatewayConfig {
    /// Socket address the HTTP server binds to.
    pub listen_addr: String,
    /// Upstream base URL without a trailing slash.
    pub upstream_base: String,
    /// Secret used to validate inbound sessions and sign outbound credentials.
    pub auth_secret: Secret,
    /// Origins allowed to call the API from a browser with credentials.
    pub allowed_origins: Vec<HeaderValue>,
    /// Deadline for one upstream round trip, response body included.
    pub upstream_timeout: Duration,
    pub identity_provider: Option<IdentityProviderConfig>,
}

impl GatewayConfig {
    /// Build a config with defaults for everything but the upstream and secret.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] if `upstream_base` is not an absolute
    /// `http://` or `https://` URL, or [`ConfigError::Missing`] if the secret is empty.
    pub fn new(
        upstream_base: &str,
        auth_secret: impl Into<Vec<u8>>,
    ) -> Result<Self, ConfigError> {
        let auth_secret = Secret::new(auth_secret);
        if auth_secret.as_bytes().is_empty() {
            return Err(ConfigError::Missing { key: ENV_AUTH_SECRET });
        }
        Ok(Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_owned(),
            upstream_base: parse_upstream_base(upstream_base)?,
            auth_secret,
            allowed_origins: vec![HeaderValue::from_static(DEFAULT_ALLOWED_ORIGIN)],
            upstream_timeout: DEFAULT_UPSTREAM_TIMEOUT,
            identity_provider: None,
        })
    }

    /// Read the configuration from the process environment.
    ///
    /// # Errors
    /// See [`GatewayConfig::from_lookup`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through `lookup`, which maps a variable name to
    /// its value.
    ///
    /// # Errors
    /// Returns [`ConfigError::Missing`] if `API_URL` or `AUTH_SECRET` is unset,
    /// or if only one of the Google client variables is set. Returns
    /// [`ConfigError::Invalid`] for unparseable values.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let upstream = get(ENV_API_URL).ok_or(ConfigError::Missing { key: ENV_API_URL })?;
        let secret = lookup(ENV_AUTH_SECRET)
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing { key: ENV_AUTH_SECRET })?;

        let mut config = Self::new(&upstream, secret)?;

        if let Some(addr) = get(ENV_LISTEN_ADDR) {
            config.listen_addr = addr.trim().to_owned();
        }
        if let Some(origins) = get(ENV_ALLOWED_ORIGINS) {
            config.allowed_origins = parse_origins(&origins)?;
        }
        if let Some(secs) = get(ENV_UPSTREAM_TIMEOUT_SECS) {
            config.upstream_timeout = parse_timeout(&secs)?;
        }

        config.identity_provider = match (get(ENV_GOOGLE_CLIENT_ID), get(ENV_GOOGLE_CLIENT_SECRET)) {
            (Some(client_id), Some(client_secret)) => Some(IdentityProviderConfig {
                client_id,
                client_secret: Secret::new(client_secret),
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing { key: ENV_GOOGLE_CLIENT_SECRET }),
            (None, Some(_)) => return Err(ConfigError::Missing { key: ENV_GOOGLE_CLIENT_ID }),
        };

        Ok(config)
    }

    /// Override the upstream deadline.
    #[must_use]
    pub fn with_upstream_timeout(mut self, timeout: Duration) -> Self {
        self.upstream_timeout = timeout;
        self
    }
}

fn parse_upstream_base(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let uri: Uri = trimmed.parse().map_err(|e| ConfigError::Invalid {
        key: ENV_API_URL,
        reason: format!("{e}"),
    })?;

    match uri.scheme_str() {
        Some("http" | "https") => {}
        Some(other) => {
            return Err(ConfigError::Invalid {
                key: ENV_API_URL,
                reason: format!("unsupported scheme '{other}'; expected 'http' or 'https'"),
            })
        }
        None => {
            return Err(ConfigError::Invalid {
                key: ENV_API_URL,
                reason: "must be an absolute URL".to_owned(),
            })
        }
    }
    if uri.authority().is_none() {
        return Err(ConfigError::Invalid {
            key: ENV_API_URL,
            reason: "missing host".to_owned(),
        });
    }
    if uri.query().is_some() {
        return Err(ConfigError::Invalid {
            key: ENV_API_URL,
            reason: "must not carry a query string".to_owned(),
        });
    }

    Ok(trimmed.to_owned())
}

fn parse_origins(raw: &str) -> Result<Vec<HeaderValue>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| {
            if origin == "*" {
                return Err(ConfigError::Invalid {
                    key: ENV_ALLOWED_ORIGINS,
                    reason: "wildcard origin cannot be combined with credentials".to_owned(),
                });
            }
            HeaderValue::from_str(origin).map_err(|e| ConfigError::Invalid {
                key: ENV_ALLOWED_ORIGINS,
                reason: format!("'{origin}': {e}"),
            })
        })
        .collect()
}

fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::Invalid {
            key: ENV_UPSTREAM_TIMEOUT_SECS,
            reason: "must be positive".to_owned(),
        }),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(e) => Err(ConfigError::Invalid {
            key: ENV_UPSTREAM_TIMEOUT_SECS,
            reason: e.to_string(),
        }),
    }
}
