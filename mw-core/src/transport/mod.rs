//! HTTP transport abstraction.
//!
//! The client builds a complete [`HttpRequest`] (method, URL, headers, body)
//! and hands it to a [`Transport`], which returns the raw status, headers and
//! body bytes. Everything MediaWiki-specific (parameter encoding, gzip,
//! charset handling, status interpretation) stays in the client, so a
//! transport only has to move bytes and keep cookies.
//!
//! [`http::HttpTransport`] is the reqwest-backed implementation used by
//! default. Tests and embedders can supply their own.
//!
//! # Examples
//!
//! ```rust,no_run
//! use mw_core::cookies::CookieJar;
//! use mw_core::transport::{http::HttpTransport, HttpRequest, Transport};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut transport = HttpTransport::new(CookieJar::in_memory(), None)?;
//!     let request = HttpRequest::get("https://en.wikipedia.org/w/api.php?action=query&format=json");
//!     let response = transport.send(request).await?;
//!     println!("status {}", response.status);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod http;

pub use config::*;

use crate::error::MwResult;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::HeaderMap;
use std::collections::HashMap;

/// Core transport trait for talking to a wiki.
///
/// Implementations send exactly one HTTP request per [`Transport::send`]
/// call and never retry. Network and TLS failures are returned as errors;
/// HTTP status codes are returned as-is in [`HttpResponse::status`].
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request and return the raw response.
    async fn send(&mut self, request: HttpRequest) -> MwResult<HttpResponse>;

    /// Get transport-specific metadata and statistics.
    fn get_info(&self) -> TransportInfo;
}

/// HTTP method used for an API request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// Parameters travel in the query string
    Get,
    /// Parameters travel in a form-encoded body
    Post,
}

impl HttpMethod {
    /// Method name as sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

/// A fully built outbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Request method
    pub method: HttpMethod,
    /// Absolute URL, including any query string
    pub url: String,
    /// Headers in insertion order
    pub headers: Vec<(String, String)>,
    /// Request body (POST only)
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Create a GET request with no headers.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Create a POST request carrying `body`.
    pub fn post(url: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            method: HttpMethod::Post,
            url: url.into(),
            headers: Vec::new(),
            body: Some(body),
        }
    }

    /// Add a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Look up a header value by case-insensitive name.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Raw response as returned by a transport.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: HeaderMap,
    /// Undecoded body bytes (still compressed if the server compressed them)
    pub body: Bytes,
}

impl HttpResponse {
    /// Create a response with no headers.
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Look up a header as a string, ignoring values that are not visible ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport information and statistics.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TransportInfo {
    /// Type of transport (e.g. "http")
    pub transport_type: String,

    /// Number of requests sent
    pub requests_sent: u64,

    /// Number of responses received
    pub responses_received: u64,

    /// Number of errors encountered
    pub errors: u64,

    /// Transport-specific metadata
    pub metadata: HashMap<String, serde_json::Value>,
}

impl TransportInfo {
    /// Create a new transport info structure.
    pub fn new(transport_type: impl Into<String>) -> Self {
        Self {
            transport_type: transport_type.into(),
            requests_sent: 0,
            responses_received: 0,
            errors: 0,
            metadata: HashMap::new(),
        }
    }

    /// Increment the request counter.
    pub fn increment_requests_sent(&mut self) {
        self.requests_sent += 1;
    }

    /// Increment the response counter.
    pub fn increment_responses_received(&mut self) {
        self.responses_received += 1;
    }

    /// Increment the error counter.
    pub fn increment_errors(&mut self) {
        self.errors += 1;
    }

    /// Add transport-specific metadata.
    pub fn add_metadata(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.metadata.insert(key.into(), value);
    }
}
