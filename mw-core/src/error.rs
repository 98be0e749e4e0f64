//! Error types for MediaWiki API operations.
//!
//! Failures are split by where they happen so callers can tell them apart:
//! - **Transport**: the HTTP exchange itself failed (network, TLS, status)
//! - **Decode**: a response arrived but its body is not usable data
//! - **Protocol**: the data decoded but lacks fields the client relies on
//! - **Config** / **Cookie**: local setup problems
//!
//! A rejected login is not an error; [`crate::MediaWiki::login`] reports it
//! as `Ok(false)`.

use thiserror::Error;

/// The main error type for all client operations.
///
/// # Examples
///
/// ```rust
/// use mw_core::error::{MwError, TransportError};
///
/// let error = MwError::Transport(TransportError::HttpError {
///     status_code: 503,
///     reason: "Service Unavailable".to_string(),
/// });
///
/// assert_eq!(error.category(), "transport");
/// ```
#[derive(Error, Debug)]
pub enum MwError {
    /// Network, TLS or HTTP status failures
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Response body could not be turned into structured data
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Decoded response is missing data the client needs
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Configuration errors (invalid endpoint, unreadable config files, etc.)
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Cookie jar persistence errors
    #[error("Cookie error: {0}")]
    Cookie(#[from] CookieError),

    /// Timestamp did not match `YYYY-MM-DDTHH:MM:SSZ`
    #[error("Invalid timestamp '{input}': {reason}")]
    DateParse {
        /// The rejected input
        input: String,
        /// Why it was rejected
        reason: String,
    },

    /// IO errors
    #[error("IO error: {source}")]
    Io {
        #[from]
        /// The underlying IO error
        source: std::io::Error,
    },
}

/// Failures of the HTTP exchange.
#[derive(Error, Debug, Clone)]
#[allow(missing_docs)]
pub enum TransportError {
    /// Could not reach the server
    #[error("Failed to connect to {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    /// Server answered with a non-success status
    #[error("HTTP error: {status_code} - {reason}")]
    HttpError { status_code: u16, reason: String },

    /// Request exceeded the configured transport timeout
    #[error("Request to {url} timed out: {reason}")]
    TimeoutError { url: String, reason: String },

    /// Generic network error
    #[error("Network error: {reason}")]
    NetworkError { reason: String },

    /// Request could not be constructed (bad header value, bad URL)
    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },
}

/// Failures turning a response body into structured data.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// Body is not valid JSON
    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Body declared `Content-Encoding: gzip` but did not inflate
    #[error("Invalid gzip stream: {reason}")]
    Gzip {
        /// Decompressor message
        reason: String,
    },

    /// Body bytes are not valid in the declared charset
    #[error("Body is not valid {charset}")]
    Charset {
        /// Charset label used for decoding
        charset: String,
    },
}

/// The response decoded but does not have the shape the client expects.
#[derive(Error, Debug, Clone)]
#[allow(missing_docs)]
pub enum ProtocolError {
    /// Required field missing from a response
    #[error("Missing field '{field}' in {action} response")]
    MissingField { field: String, action: String },

    /// Namespace table keyed by something other than an integer
    #[error("Invalid namespace id '{id}'")]
    InvalidNamespaceId { id: String },
}

/// Configuration-related errors.
#[derive(Error, Debug, Clone)]
#[allow(missing_docs)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    /// Configuration file has invalid format
    #[error("Invalid configuration format in {path}: {reason}")]
    InvalidFormat { path: String, reason: String },

    /// Configuration parameter has invalid value
    #[error("Invalid value for parameter '{parameter}': {value} - {reason}")]
    InvalidValue {
        parameter: String,
        value: String,
        reason: String,
    },
}

/// Cookie jar persistence errors.
#[derive(Error, Debug, Clone)]
#[allow(missing_docs)]
pub enum CookieError {
    /// Cookie file exists but could not be read or parsed
    #[error("Failed to load cookies from {path}: {reason}")]
    Load { path: String, reason: String },

    /// Cookie file could not be written
    #[error("Failed to save cookies to {path}: {reason}")]
    Save { path: String, reason: String },

    /// The shared store lock was poisoned by a panicking holder
    #[error("Cookie store lock poisoned")]
    Poisoned,
}

/// Convenience type alias for Results using MwError.
pub type MwResult<T> = Result<T, MwError>;

impl MwError {
    /// Create a missing-field protocol error.
    pub fn missing_field(action: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Protocol(ProtocolError::MissingField {
            field: field.into(),
            action: action.into(),
        })
    }

    /// Get the error category for this error.
    ///
    /// This is useful for structured logging.
    pub fn category(&self) -> &'static str {
        match self {
            MwError::Transport(_) => "transport",
            MwError::Decode(_) => "decode",
            MwError::Protocol(_) => "protocol",
            MwError::Config(_) => "config",
            MwError::Cookie(_) => "cookie",
            MwError::DateParse { .. } => "date",
            MwError::Io { .. } => "io",
        }
    }
}

impl From<serde_json::Error> for MwError {
    fn from(err: serde_json::Error) -> Self {
        MwError::Decode(DecodeError::Json(err))
    }
}

impl From<reqwest::Error> for MwError {
    fn from(err: reqwest::Error) -> Self {
        let url = err
            .url()
            .map(|u| u.to_string())
            .unwrap_or_else(|| "<unknown>".to_string());

        if err.is_timeout() {
            MwError::Transport(TransportError::TimeoutError {
                url,
                reason: err.to_string(),
            })
        } else if err.is_connect() {
            MwError::Transport(TransportError::ConnectionFailed {
                url,
                reason: err.to_string(),
            })
        } else if err.is_builder() {
            MwError::Transport(TransportError::InvalidRequest {
                reason: err.to_string(),
            })
        } else if let Some(status) = err.status() {
            MwError::Transport(TransportError::HttpError {
                status_code: status.as_u16(),
                reason: err.to_string(),
            })
        } else {
            MwError::Transport(TransportError::NetworkError {
                reason: err.to_string(),
            })
        }
    }
}
