//! The blocking facade against a mock wiki
//!
//! The mock server runs on its own runtime; the blocking client drives its
//! own current-thread runtime, so the calls happen outside any async context.

use mw_core::blocking::MediaWiki;
use mw_tests::{api_url, fixtures, setup_test_logging};
use serde_json::json;
use tokio::runtime::Runtime;
use wiremock::matchers::{body_string_contains, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn start_server(rt: &Runtime) -> MockServer {
    rt.block_on(MockServer::start())
}

#[test]
fn test_blocking_session_workflow() {
    setup_test_logging();
    let rt = Runtime::new().unwrap();
    let server = start_server(&rt);

    rt.block_on(async {
        Mock::given(method("POST"))
            .and(body_string_contains("lgtoken=tok123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::login_success("Bot")))
            .with_priority(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_string_contains("action=login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::login_need_token("tok123")))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_string_contains("meta=userinfo"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(fixtures::user_rights(&["read", "apihighlimits"])),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_string_contains("siprop=namespaces"))
            .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::namespaces()))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_string_contains("action=logout"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;
    });

    let mut wiki = MediaWiki::new(api_url(&server)).unwrap();

    assert!(wiki.login("Bot", "hunter2", None).unwrap());
    assert_eq!(wiki.limits(50, 500).unwrap(), 500);
    assert_eq!(wiki.limits(50, 500).unwrap(), 500);
    assert_eq!(wiki.namespaces(true).unwrap().len(), 6);
    assert_eq!(wiki.namespaces(false).unwrap().len(), 4);
    assert!(wiki.logout().unwrap());

    assert_eq!(wiki.transport_info().requests_sent, 5);
}

#[test]
fn test_blocking_normalize_endpoint() {
    setup_test_logging();
    let rt = Runtime::new().unwrap();
    let server = start_server(&rt);

    rt.block_on(
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::siteinfo()))
            .expect(1)
            .mount(&server),
    );

    let mut wiki = MediaWiki::new(api_url(&server)).unwrap();
    assert_eq!(wiki.normalize_endpoint().unwrap(), Some(api_url(&server)));
}
