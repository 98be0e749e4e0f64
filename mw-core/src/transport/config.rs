//! Client configuration.
//!
//! Configurations can be created programmatically or loaded from JSON, YAML
//! or TOML files.
//!
//! # Examples
//!
//! ```rust
//! use mw_core::transport::{ClientConfig, HttpAuth};
//! use std::time::Duration;
//!
//! let config = ClientConfig::new("https://wiki.example.org/w/api.php")
//!     .unwrap()
//!     .http_auth(HttpAuth::new("gate", "keeper"))
//!     .timeout(Duration::from_secs(30));
//!
//! assert!(config.validate().is_ok());
//! ```

use crate::error::{ConfigError, MwResult};
use crate::user_agent::DEFAULT_USER_AGENT;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Everything needed to construct a [`crate::MediaWiki`] client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// URL of the wiki's `api.php`
    pub endpoint: Url,

    /// Sent as `User-Agent` on every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Persist cookies to this file (created on first use)
    #[serde(default)]
    pub cookie_file: Option<PathBuf>,

    /// Overall per-request timeout handed to the HTTP client
    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<Duration>,

    /// HTTP basic-auth credentials for wikis behind a password prompt
    #[serde(default)]
    pub http_auth: Option<HttpAuth>,
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

/// HTTP basic-auth credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpAuth {
    /// Basic-auth user name
    pub username: String,
    /// Basic-auth password
    pub password: String,
}

impl HttpAuth {
    /// Create a new credential pair.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl ClientConfig {
    /// Create a configuration for `endpoint` with default settings.
    pub fn new(endpoint: impl AsRef<str>) -> MwResult<Self> {
        let url = endpoint
            .as_ref()
            .parse()
            .map_err(|e| ConfigError::InvalidValue {
                parameter: "endpoint".to_string(),
                value: endpoint.as_ref().to_string(),
                reason: format!("Invalid URL: {}", e),
            })?;

        Ok(Self {
            endpoint: url,
            user_agent: default_user_agent(),
            cookie_file: None,
            timeout: None,
            http_auth: None,
        })
    }

    /// Set the user agent.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set basic-auth credentials.
    pub fn http_auth(mut self, auth: HttpAuth) -> Self {
        self.http_auth = Some(auth);
        self
    }

    /// Persist cookies to `path`.
    pub fn cookie_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.cookie_file = Some(path.into());
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> MwResult<()> {
        if self.endpoint.scheme() != "http" && self.endpoint.scheme() != "https" {
            return Err(ConfigError::InvalidValue {
                parameter: "endpoint".to_string(),
                value: self.endpoint.to_string(),
                reason: "URL must use http or https scheme".to_string(),
            }
            .into());
        }

        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                parameter: "user_agent".to_string(),
                value: self.user_agent.clone(),
                reason: "User agent cannot be empty".to_string(),
            }
            .into());
        }

        if let Some(ref auth) = self.http_auth {
            if auth.username.is_empty() {
                return Err(ConfigError::InvalidValue {
                    parameter: "http_auth".to_string(),
                    value: "basic".to_string(),
                    reason: "Username cannot be empty".to_string(),
                }
                .into());
            }
        }

        Ok(())
    }

    /// Load configuration from a file.
    ///
    /// Supports JSON, YAML, and TOML formats based on file extension.
    pub fn from_file(path: impl AsRef<Path>) -> MwResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|_e| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let invalid = |reason: String| ConfigError::InvalidFormat {
            path: path.display().to_string(),
            reason,
        };

        let config: Self = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::from_str(&content).map_err(|e| invalid(e.to_string()))?,
            Some("yaml") | Some("yml") => {
                serde_yaml::from_str(&content).map_err(|e| invalid(e.to_string()))?
            }
            Some("toml") => toml::from_str(&content).map_err(|e| invalid(e.to_string()))?,
            _ => {
                return Err(invalid(
                    "Unsupported file format. Use .json, .yaml, or .toml".to_string(),
                )
                .into())
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file.
    pub fn to_file(&self, path: impl AsRef<Path>) -> MwResult<()> {
        let path = path.as_ref();
        let invalid = |reason: String| ConfigError::InvalidFormat {
            path: path.display().to_string(),
            reason,
        };

        let content = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => {
                serde_json::to_string_pretty(self).map_err(|e| invalid(e.to_string()))?
            }
            Some("yaml") | Some("yml") => {
                serde_yaml::to_string(self).map_err(|e| invalid(e.to_string()))?
            }
            Some("toml") => toml::to_string(self).map_err(|e| invalid(e.to_string()))?,
            _ => {
                return Err(invalid(
                    "Unsupported file format. Use .json, .yaml, or .toml".to_string(),
                )
                .into())
            }
        };

        std::fs::write(path, content)?;

        Ok(())
    }
}
