//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `AUTOHAUS_DATABASE_URL` - `SQLite` connection string (e.g. `sqlite://autohaus.db`)
//! - `SMTP_HOST` - Outbound mail relay host
//! - `SMTP_USERNAME` - SMTP account username
//! - `SMTP_PASSWORD` - SMTP account password
//! - `SMTP_FROM_ADDRESS` - From address for transactional mail
//!
//! ## Optional
//! - `AUTOHAUS_HOST` - Bind address (default: 127.0.0.1)
//! - `AUTOHAUS_PORT` - Listen port (default: 3000)
//! - `SMTP_PORT` - Mail relay port (default: 465)
//! - `SMTP_FROM_NAME` - Display name for the From header (default: Autohaus)

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `SQLite` database connection URL
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Outbound email configuration
    pub email: EmailConfig,
}

/// SMTP configuration for transactional email.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct EmailConfig {
    /// Mail relay host
    pub smtp_host: String,
    /// Mail relay port
    pub smtp_port: u16,
    /// SMTP account username
    pub smtp_username: String,
    /// SMTP account password
    pub smtp_password: SecretString,
    /// From address for transactional mail
    pub from_address: String,
    /// Display name for the From header
    pub from_name: String,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_username", &self.smtp_username)
            .field("smtp_password", &"[REDACTED]")
            .field("from_address", &self.from_address)
            .field("from_name", &self.from_name)
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing or a value
    /// fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = SecretString::from(require_env("AUTOHAUS_DATABASE_URL")?);

        let host = optional_env("AUTOHAUS_HOST")
            .unwrap_or_else(|| "127.0.0.1".to_owned())
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("AUTOHAUS_HOST".to_owned(), e.to_string()))?;

        let port = optional_env("AUTOHAUS_PORT")
            .unwrap_or_else(|| "3000".to_owned())
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("AUTOHAUS_PORT".to_owned(), e.to_string()))?;

        let smtp_port = optional_env("SMTP_PORT")
            .unwrap_or_else(|| "465".to_owned())
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("SMTP_PORT".to_owned(), e.to_string()))?;

        let email = EmailConfig {
            smtp_host: require_env("SMTP_HOST")?,
            smtp_port,
            smtp_username: require_env("SMTP_USERNAME")?,
            smtp_password: SecretString::from(require_env("SMTP_PASSWORD")?),
            from_address: require_env("SMTP_FROM_ADDRESS")?,
            from_name: optional_env("SMTP_FROM_NAME").unwrap_or_else(|| "Autohaus".to_owned()),
        };

        Ok(Self {
            database_url,
            host,
            port,
            email,
        })
    }

    /// Socket address to bind the server to.
    #[must_use]
    pub const fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn require_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_owned()))
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}
