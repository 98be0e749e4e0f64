//! Raw API calls against a mock wiki: request shape, decoding and errors

use assert_matches::assert_matches;
use mw_core::error::{DecodeError, TransportError};
use mw_core::{MediaWiki, MwError};
use mw_tests::{api_url, fixtures, gzip_compress, setup_test_logging, test_client, API_PATH, TEST_USER_AGENT};
use serde_json::json;
use wiremock::matchers::{body_string, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_call_posts_form_with_format_json() {
    setup_test_logging();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(API_PATH))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string("action=query&format=json&meta=siteinfo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::siteinfo()))
        .expect(2)
        .mount(&server)
        .await;

    let mut wiki = test_client(&server).unwrap();

    let response = wiki
        .call([("action", "query"), ("meta", "siteinfo")])
        .await
        .unwrap();
    assert_eq!(response["query"]["general"]["sitename"], "Test Wiki");

    // A caller-supplied format is overridden
    wiki.call([("action", "query"), ("meta", "siteinfo"), ("format", "xml")])
        .await
        .unwrap();
}

#[tokio::test]
async fn test_call_sends_identifying_headers() {
    setup_test_logging();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(header("user-agent", TEST_USER_AGENT))
        .and(header("accept-encoding", "gzip"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let mut wiki = test_client(&server).unwrap();
    wiki.call([("action", "query")]).await.unwrap();
}

#[tokio::test]
async fn test_http_basic_auth() {
    setup_test_logging();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(header("authorization", "Basic dXNlcjpwYXNz"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let mut wiki = MediaWiki::builder(api_url(&server))
        .http_auth("user", "pass")
        .build()
        .unwrap();

    let response = wiki.call([("action", "query")]).await.unwrap();
    assert_eq!(response["ok"], true);
}

#[tokio::test]
async fn test_gzip_response_is_inflated() {
    setup_test_logging();
    let server = MockServer::start().await;
    let body = fixtures::siteinfo().to_string();

    Mock::given(method("POST"))
        .and(body_string_contains("meta=siteinfo"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-encoding", "gzip")
                .set_body_raw(gzip_compress(body.as_bytes()), "application/json; charset=utf-8"),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("meta=userinfo"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body.clone(), "application/json"))
        .mount(&server)
        .await;

    let mut wiki = test_client(&server).unwrap();
    let gzipped = wiki
        .call([("action", "query"), ("meta", "siteinfo")])
        .await
        .unwrap();
    let plain = wiki
        .call([("action", "query"), ("meta", "userinfo")])
        .await
        .unwrap();

    assert_eq!(gzipped, plain);
    assert_eq!(gzipped["query"]["general"]["generator"], "MediaWiki 1.41.0");
}

#[tokio::test]
async fn test_response_charset_is_honoured() {
    setup_test_logging();
    let server = MockServer::start().await;

    // {"title":"Café"} in ISO-8859-1
    let mut body = b"{\"title\":\"Caf".to_vec();
    body.extend_from_slice(&[0xE9]);
    body.extend_from_slice(b"\"}");

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/json; charset=ISO-8859-1"))
        .mount(&server)
        .await;

    let mut wiki = test_client(&server).unwrap();
    let response = wiki.call([("action", "query")]).await.unwrap();
    assert_eq!(response["title"], "Café");
}

#[tokio::test]
async fn test_http_error_status_propagates() {
    setup_test_logging();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Wiki is in read-only mode"))
        .mount(&server)
        .await;

    let mut wiki = test_client(&server).unwrap();
    let error = wiki.call([("action", "edit")]).await.unwrap_err();

    assert_matches!(
        error,
        MwError::Transport(TransportError::HttpError { status_code: 503, ref reason })
            if reason.contains("read-only")
    );
    assert_eq!(error.category(), "transport");
}

#[tokio::test]
async fn test_html_body_is_decode_error() {
    setup_test_logging();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("<!DOCTYPE html><p>Main Page</p>", "text/html; charset=UTF-8"),
        )
        .mount(&server)
        .await;

    let mut wiki = test_client(&server).unwrap();
    let result = wiki.call([("action", "query")]).await;
    assert_matches!(result, Err(MwError::Decode(DecodeError::Json(_))));
}

#[tokio::test]
async fn test_transport_statistics() {
    setup_test_logging();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let mut wiki = test_client(&server).unwrap();
    for _ in 0..3 {
        wiki.call([("action", "query")]).await.unwrap();
    }

    let info = wiki.transport_info();
    assert_eq!(info.transport_type, "http");
    assert_eq!(info.requests_sent, 3);
    assert_eq!(info.responses_received, 3);
    assert_eq!(info.errors, 0);
}
