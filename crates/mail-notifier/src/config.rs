//! SMTP configuration.

use secrecy::{ExposeSecret, SecretString};
use std::env;

use triage_core::NotifyError;

/// Configuration for connecting to the SMTP relay.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    /// SMTP host (default: smtp.gmail.com)
    pub host: String,
    /// SMTP port (default: 587)
    pub port: u16,
    /// Sender account; also used as the From address.
    pub username: String,
    /// Account password or app password.
    password: SecretString,
    /// Per-send timeout in seconds (default: 30).
    pub timeout_secs: u64,
}

impl SmtpConfig {
    /// Create a new configuration with explicit values.
    pub fn new(
        host: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            username: username.into(),
            password: SecretString::from(password.into()),
            timeout_secs: 30,
        }
    }

    /// Create configuration from environment variables.
    ///
    /// Required:
    /// - `SMTP_USERNAME` - sender account / From address
    /// - `SMTP_PASSWORD` - account password
    ///
    /// Optional (with defaults):
    /// - `SMTP_HOST` - Default: smtp.gmail.com
    /// - `SMTP_PORT` - Default: 587
    /// - `SMTP_TIMEOUT_SECS` - Default: 30
    pub fn from_env() -> Result<Self, NotifyError> {
        let host = env::var("SMTP_HOST").unwrap_or_else(|_| "smtp.gmail.com".to_string());

        let port = env::var("SMTP_PORT")
            .unwrap_or_else(|_| "587".to_string())
            .parse::<u16>()
            .map_err(|e| NotifyError::Configuration(format!("Invalid SMTP_PORT: {}", e)))?;

        let username = env::var("SMTP_USERNAME")
            .map_err(|_| NotifyError::Configuration("SMTP_USERNAME not set".to_string()))?;

        let password = env::var("SMTP_PASSWORD")
            .map_err(|_| NotifyError::Configuration("SMTP_PASSWORD not set".to_string()))?;

        let timeout_secs = env::var("SMTP_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);

        Ok(Self {
            host,
            port,
            username,
            password: SecretString::from(password),
            timeout_secs,
        })
    }

    /// Get the password (exposes the secret).
    pub(crate) fn password(&self) -> &str {
        self.password.expose_secret()
    }

    /// Builder method to set the timeout.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}
