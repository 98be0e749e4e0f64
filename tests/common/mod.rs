//! Common test utilities shared across the integration tests

use std::io::Write;

use flate2::write::GzEncoder;
use flate2::Compression;
use mw_core::MediaWiki;
use serde_json::{json, Value};
use wiremock::MockServer;

/// Path the mock wiki serves its API from
pub const API_PATH: &str = "/w/api.php";

/// User agent used by test clients
pub const TEST_USER_AGENT: &str = "IntegrationBot/1.0 (+https://example.org/bot)";

/// Setup logging for tests
///
/// Safe to call from every test; only the first call installs the subscriber.
pub fn setup_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("mw_core=debug")
        .with_test_writer()
        .try_init();
}

/// API URL on `server`
pub fn api_url(server: &MockServer) -> String {
    format!("{}{}", server.uri(), API_PATH)
}

/// Client for `server` with the test user agent and in-memory cookies
pub fn test_client(server: &MockServer) -> anyhow::Result<MediaWiki> {
    Ok(MediaWiki::builder(api_url(server))
        .user_agent(TEST_USER_AGENT)
        .build()?)
}

/// Gzip-compress `data`
pub fn gzip_compress(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).expect("writing to a Vec cannot fail");
    encoder.finish().expect("finishing a Vec encoder cannot fail")
}

/// Canned API responses
pub mod fixtures {
    use super::*;

    /// First step of the legacy login handshake
    pub fn login_need_token(token: &str) -> Value {
        json!({"login": {"result": "NeedToken", "token": token, "cookieprefix": "testwiki"}})
    }

    /// Successful login
    pub fn login_success(user: &str) -> Value {
        json!({"login": {"result": "Success", "lguserid": 7, "lgusername": user}})
    }

    /// `meta=userinfo&uiprop=rights` response
    pub fn user_rights(rights: &[&str]) -> Value {
        json!({"batchcomplete": "", "query": {"userinfo": {"id": 7, "name": "Bot", "rights": rights}}})
    }

    /// `meta=siteinfo` response with general info
    pub fn siteinfo() -> Value {
        json!({"batchcomplete": "", "query": {"general": {
            "mainpage": "Main Page",
            "sitename": "Test Wiki",
            "generator": "MediaWiki 1.41.0"
        }}})
    }

    /// `siprop=namespaces` response
    pub fn namespaces() -> Value {
        json!({"batchcomplete": "", "query": {"namespaces": {
            "-2": {"id": -2, "case": "first-letter", "canonical": "Media", "*": "Media"},
            "-1": {"id": -1, "case": "first-letter", "canonical": "Special", "*": "Special"},
            "0": {"id": 0, "case": "first-letter", "content": "", "*": ""},
            "1": {"id": 1, "case": "first-letter", "canonical": "Talk", "*": "Talk"},
            "2": {"id": 2, "case": "first-letter", "canonical": "User", "*": "User"},
            "14": {"id": 14, "case": "first-letter", "canonical": "Category", "*": "Category"}
        }}})
    }
}
