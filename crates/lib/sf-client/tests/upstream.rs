//! Upstream client behavior against a stub HTTP server.

use std::collections::BTreeMap;
use std::time::Duration;

use serde_json::json;
use sf_client::auth::Credential;
use sf_client::client::{ApiError, ClientConfig, RetryPolicy, SearchApi, SearchApiClient};
use sf_client::types::{ResolveRequest, SearchRequest, SimpleSearchRequest, SourceName};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer, timeout: Duration, max_attempts: u32) -> SearchApiClient {
    let config = ClientConfig::new(server.uri())
        .with_timeout(timeout)
        .with_retry(RetryPolicy {
            max_attempts,
            backoff: Duration::from_millis(1),
        });
    SearchApiClient::new(config).unwrap()
}

fn search_request() -> SearchRequest {
    let mut sources_filters = BTreeMap::new();
    sources_filters.insert(SourceName::Library, json!({}));
    SearchRequest {
        query: "exoplanet atmospheres".to_string(),
        sources_filters,
        limit: 10,
    }
}

#[tokio::test]
async fn attaches_bearer_credential_as_authorization_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/search/"))
        .and(header("Authorization", "Bearer token-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"search_documents": []})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Duration::from_secs(1), 1);
    let response = client
        .search(search_request(), &Credential::Bearer("token-1".to_string()))
        .await
        .unwrap();
    assert!(response.search_documents.is_empty());
}

#[tokio::test]
async fn attaches_api_key_header_and_decodes_documents() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/search/simple/"))
        .and(header("X-Api-Key", "key-1"))
        .and(body_partial_json(json!({"source": "telegram", "offset": 0})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "search_documents": [{"document": {"title": "Launch day"}, "score": 0.9}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Duration::from_secs(1), 1);
    let request = SimpleSearchRequest {
        source: SourceName::Telegram,
        query: "launch".to_string(),
        limit: 5,
        offset: 0,
    };
    let response = client
        .simple_search(request, &Credential::ApiKey("key-1".to_string()))
        .await
        .unwrap();
    assert_eq!(response.search_documents.len(), 1);
    assert_eq!(
        response.search_documents[0].document["title"],
        json!("Launch day")
    );
}

#[tokio::test]
async fn retries_transient_500_the_configured_number_of_times() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/search/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("worker crashed"))
        .expect(3)
        .mount(&server)
        .await;

    let client = client_for(&server, Duration::from_secs(1), 3);
    let err = client
        .search(search_request(), &Credential::None)
        .await
        .unwrap_err();
    match err {
        ApiError::Status { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "worker crashed");
        }
        other => panic!("expected status error, got {other}"),
    }
}

#[tokio::test]
async fn does_not_retry_client_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/search/"))
        .respond_with(ResponseTemplate::new(422).set_body_string("bad filter"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Duration::from_secs(1), 3);
    let err = client
        .search(search_request(), &Credential::None)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 422, .. }));
}

#[tokio::test]
async fn authentication_rejection_is_surfaced_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/resolve/"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid key"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Duration::from_secs(1), 3);
    let request = ResolveRequest {
        identifier: "10.1038/nature12345".to_string(),
    };
    let err = client
        .resolve_id(request, &Credential::ApiKey("stale".to_string()))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Authentication { status: 401, .. }));
}

#[tokio::test]
async fn timeout_exhausts_retries_then_surfaces() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/search/simple/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"search_documents": []}))
                .set_delay(Duration::from_millis(500)),
        )
        .expect(3)
        .mount(&server)
        .await;

    let client = client_for(&server, Duration::from_millis(50), 3);
    let request = SimpleSearchRequest {
        source: SourceName::Library,
        query: "slow".to_string(),
        limit: 1,
        offset: 0,
    };
    let err = client
        .simple_search(request, &Credential::None)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Timeout));
}

#[tokio::test]
async fn no_credential_sends_no_auth_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/search/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"search_documents": []})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Duration::from_secs(1), 1);
    client
        .search(search_request(), &Credential::None)
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let headers = &requests[0].headers;
    assert!(headers.get("authorization").is_none());
    assert!(headers.get("x-api-key").is_none());
    assert!(headers.get("x-user-id").is_none());
}
