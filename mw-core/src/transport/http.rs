//! reqwest-backed HTTP transport.
//!
//! Cookies go through the client's [`CookieJar`]; a file-backed jar is saved
//! after every response. Automatic decompression is disabled so the body is
//! handed back exactly as the server sent it.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use super::{HttpMethod, HttpRequest, HttpResponse, Transport, TransportInfo};
use crate::cookies::CookieJar;
use crate::error::MwResult;

/// Transport that sends requests with a shared, cookie-aware reqwest client.
pub struct HttpTransport {
    /// HTTP client for making requests
    client: Client,
    /// Cookie jar wired into `client`
    cookies: CookieJar,
    /// Transport information
    info: TransportInfo,
}

impl HttpTransport {
    /// Create a transport using `cookies` and an optional request timeout.
    pub fn new(cookies: CookieJar, timeout: Option<Duration>) -> MwResult<Self> {
        let mut builder = Client::builder()
            .cookie_provider(cookies.provider())
            .no_gzip();

        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build()?;

        Ok(Self {
            client,
            cookies,
            info: TransportInfo::new("http"),
        })
    }

    /// Cookie jar used by this transport.
    pub fn cookies(&self) -> &CookieJar {
        &self.cookies
    }

    async fn execute(&self, request: HttpRequest) -> MwResult<HttpResponse> {
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
        };

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&mut self, request: HttpRequest) -> MwResult<HttpResponse> {
        debug!("{} {}", request.method.as_str(), request.url);
        self.info.increment_requests_sent();

        let response = match self.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                self.info.increment_errors();
                return Err(e);
            }
        };
        self.info.increment_responses_received();

        if self.cookies.is_file_backed() {
            if let Err(e) = self.cookies.save() {
                warn!("Failed to persist cookies: {}", e);
                self.info.increment_errors();
                return Err(e);
            }
        }

        Ok(response)
    }

    fn get_info(&self) -> TransportInfo {
        let mut info = self.info.clone();
        info.add_metadata(
            "file_backed_cookies",
            serde_json::json!(self.cookies.is_file_backed()),
        );
        if let Some(path) = self.cookies.path() {
            info.add_metadata("cookie_file", serde_json::json!(path.display().to_string()));
        }
        info
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("cookies", &self.cookies)
            .field("info", &self.info)
            .finish()
    }
}
