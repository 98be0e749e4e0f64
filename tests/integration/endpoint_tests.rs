//! Endpoint discovery with `normalize_endpoint`

use assert_matches::assert_matches;
use mw_core::{MediaWiki, MwError};
use mw_tests::{api_url, fixtures, setup_test_logging, API_PATH, TEST_USER_AGENT};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(url: String) -> MediaWiki {
    MediaWiki::builder(url)
        .user_agent(TEST_USER_AGENT)
        .build()
        .unwrap()
}

async fn mount_api(server: &MockServer, expected_probes: u64) {
    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("action", "query"))
        .and(query_param("meta", "siteinfo"))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::siteinfo()))
        .expect(expected_probes)
        .mount(server)
        .await;
}

async fn mount_index_page(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/w/index.php"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<!DOCTYPE html><html><body>Main Page</body></html>", "text/html; charset=UTF-8"),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_working_endpoint_is_kept() {
    setup_test_logging();
    let server = MockServer::start().await;
    mount_api(&server, 1).await;

    let mut wiki = client_for(api_url(&server));
    let found = wiki.normalize_endpoint().await.unwrap();

    assert_eq!(found, Some(api_url(&server)));
    assert_eq!(wiki.endpoint(), api_url(&server));
}

#[tokio::test]
async fn test_index_php_is_corrected() {
    setup_test_logging();
    let server = MockServer::start().await;
    mount_api(&server, 1).await;
    mount_index_page(&server).await;

    let mut wiki = client_for(format!("{}/w/index.php?title=Main_Page", server.uri()));
    let found = wiki.normalize_endpoint().await.unwrap();

    assert_eq!(found.as_deref(), Some(api_url(&server).as_str()));
    assert_eq!(wiki.endpoint(), api_url(&server));
}

#[tokio::test]
async fn test_no_api_found() {
    setup_test_logging();
    let server = MockServer::start().await;
    mount_index_page(&server).await;
    // api.php is not mounted, so wiremock answers 404

    let original = format!("{}/w/index.php", server.uri());
    let mut wiki = client_for(original.clone());

    assert_eq!(wiki.normalize_endpoint().await.unwrap(), None);
    assert_eq!(wiki.endpoint(), original);
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_unreachable_host_is_an_error() {
    setup_test_logging();

    let mut wiki = client_for("http://127.0.0.1:9/w/api.php".to_string());
    assert_matches!(wiki.normalize_endpoint().await, Err(MwError::Transport(_)));
}
