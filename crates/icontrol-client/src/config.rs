//! Session configuration
//!
//! Connection settings for a single BIG-IP. Built in code with the
//! `with_*` helpers or loaded from `ICONTROL_*` environment variables.

use crate::error::IControlError;
use std::env;
use std::fmt;
use std::time::Duration;

/// Default iControl REST port (the management interface serves HTTPS on 443)
pub const DEFAULT_PORT: u16 = 443;

/// Login provider sent with every authentication request
pub const DEFAULT_LOGIN_PROVIDER: &str = "tmos";

/// URL scheme used to reach the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scheme {
    #[default]
    Https,
    /// Plain HTTP, only useful for lab proxies and test servers
    Http,
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scheme::Https => write!(f, "https"),
            Scheme::Http => write!(f, "http"),
        }
    }
}

/// Certificate verification mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TlsMode {
    /// Verify the device certificate against the webpki roots
    #[default]
    Verify,
    /// Accept any certificate. BIG-IPs ship with self-signed management
    /// certificates, so this is common in labs, but it must be asked for.
    Insecure,
}

/// Connection settings for an iControl session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    pub scheme: Scheme,
    pub tls: TlsMode,
    /// Per-request timeout. `None` means a call may block indefinitely.
    pub timeout: Option<Duration>,
    pub login_provider: String,
}

impl ClientConfig {
    /// Create a config for `host:port` with verified HTTPS and no timeout
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            scheme: Scheme::Https,
            tls: TlsMode::Verify,
            timeout: None,
            login_provider: DEFAULT_LOGIN_PROVIDER.to_string(),
        }
    }

    pub fn with_scheme(mut self, scheme: Scheme) -> Self {
        self.scheme = scheme;
        self
    }

    pub fn with_tls(mut self, tls: TlsMode) -> Self {
        self.tls = tls;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_login_provider(mut self, provider: impl Into<String>) -> Self {
        self.login_provider = provider.into();
        self
    }

    /// Device root, e.g. `https://10.0.0.1:443`
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port)
    }

    /// Load configuration from the process environment
    ///
    /// Reads `ICONTROL_HOST` (required), `ICONTROL_PORT`, `ICONTROL_SCHEME`,
    /// `ICONTROL_INSECURE`, `ICONTROL_TIMEOUT_SECS` and
    /// `ICONTROL_LOGIN_PROVIDER`.
    pub fn from_env() -> Result<Self, IControlError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] but reads values through `lookup`
    pub fn from_lookup<F>(lookup: F) -> Result<Self, IControlError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("ICONTROL_HOST")
            .filter(|h| !h.trim().is_empty())
            .ok_or_else(|| {
                IControlError::InvalidConfig("ICONTROL_HOST environment variable is required".to_string())
            })?;

        let port = match lookup("ICONTROL_PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| {
                IControlError::InvalidConfig(format!("ICONTROL_PORT '{}' is not a valid port: {}", raw, e))
            })?,
            None => DEFAULT_PORT,
        };

        let mut config = Self::new(host.trim(), port);

        if let Some(raw) = lookup("ICONTROL_SCHEME") {
            config.scheme = match raw.trim().to_ascii_lowercase().as_str() {
                "https" => Scheme::Https,
                "http" => Scheme::Http,
                other => {
                    return Err(IControlError::InvalidConfig(format!(
                        "ICONTROL_SCHEME must be 'http' or 'https', got '{}'",
                        other
                    )));
                }
            };
        }

        if lookup("ICONTROL_INSECURE").is_some_and(|v| parse_flag(&v)) {
            config.tls = TlsMode::Insecure;
        }

        if let Some(raw) = lookup("ICONTROL_TIMEOUT_SECS") {
            let secs = raw.trim().parse::<u64>().map_err(|e| {
                IControlError::InvalidConfig(format!("ICONTROL_TIMEOUT_SECS '{}' is not a number: {}", raw, e))
            })?;
            config.timeout = Some(Duration::from_secs(secs));
        }

        if let Some(provider) = lookup("ICONTROL_LOGIN_PROVIDER").filter(|p| !p.trim().is_empty()) {
            config.login_provider = provider.trim().to_string();
        }

        Ok(config)
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
