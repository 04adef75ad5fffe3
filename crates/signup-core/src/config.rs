//! Configuration types for the signup registry
//!
//! This module defines all configuration structures used throughout the crate.

use serde::{Deserialize, Serialize};

/// Main signup registry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupConfig {
    /// Roster source configuration
    pub roster: RosterConfig,

    /// Record store configuration
    pub store: StoreConfig,

    /// Mail transport configuration
    pub mailer: MailerConfig,

    /// Optional HTTP settings
    #[serde(default)]
    pub http: HttpConfig,
}

impl SignupConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.roster.validate()?;
        self.store.validate()?;
        self.mailer.validate()?;
        self.http.validate()?;
        Ok(())
    }
}

/// Roster source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterConfig {
    /// Path to the externally-refreshed roster document
    pub path: String,
}

impl RosterConfig {
    /// Validate the roster configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.path.is_empty() {
            return Err(crate::Error::config("roster path cannot be empty"));
        }
        Ok(())
    }
}

/// Record store configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreConfig {
    /// File-based record store (one document per student)
    File {
        /// Records directory
        dir: String,
        /// Optional path to the append-only audit log
        #[serde(default)]
        audit_log: Option<String>,
    },

    /// In-memory record store (not persistent)
    #[default]
    Memory,
}

impl StoreConfig {
    /// Validate the store configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            StoreConfig::File { dir, audit_log } => {
                if dir.is_empty() {
                    return Err(crate::Error::config("records directory cannot be empty"));
                }
                if let Some(path) = audit_log
                    && path.is_empty()
                {
                    return Err(crate::Error::config("audit log path cannot be empty"));
                }
                Ok(())
            }
            StoreConfig::Memory => Ok(()),
        }
    }
}

/// Mail transport configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MailerConfig {
    /// HTTP mail gateway transport
    Http {
        /// Gateway endpoint delivery requests are posted to
        endpoint: String,
    },

    /// Log-only transport (development)
    Log,
}

impl MailerConfig {
    /// Validate the mailer configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            MailerConfig::Http { endpoint } => {
                if endpoint.is_empty() {
                    return Err(crate::Error::config("mailer endpoint cannot be empty"));
                }
                if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                    return Err(crate::Error::config(format!(
                        "mailer endpoint must use HTTP or HTTPS scheme, got: {}",
                        endpoint
                    )));
                }
                Ok(())
            }
            MailerConfig::Log => Ok(()),
        }
    }

    /// Get the transport type name
    pub fn type_name(&self) -> &str {
        match self {
            MailerConfig::Http { .. } => "http",
            MailerConfig::Log => "log",
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Bind address for the HTTP listener
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl HttpConfig {
    /// Validate the HTTP configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.bind
            .parse::<std::net::SocketAddr>()
            .map_err(|e| crate::Error::config(format!("invalid bind address {}: {}", self.bind, e)))?;
        Ok(())
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}
