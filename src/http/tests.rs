//! Tests for the HTTP client module

use super::*;
use crate::auth::Authenticator;
use crate::error::Error;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_config() -> HttpClientConfig {
    HttpClientConfig::builder()
        .retry(RetryPolicy::new(5, Duration::from_millis(1)))
        .build()
}

async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.unwrap().len()
}

#[test]
fn test_http_client_config_default() {
    let config = HttpClientConfig::default();
    assert_eq!(config.retry.max_attempts, 5);
    assert!(config.user_agent.starts_with("tap-opsgenie/"));
}

#[test]
fn test_http_client_config_builder() {
    let config = HttpClientConfig::builder()
        .retry(RetryPolicy::new(3, Duration::from_millis(200)))
        .header("X-Custom", "value")
        .user_agent("test-agent/1.0")
        .build();

    assert_eq!(config.retry.max_attempts, 3);
    assert_eq!(config.retry.initial_backoff, Duration::from_millis(200));
    assert_eq!(
        config.default_headers.get("X-Custom"),
        Some(&"value".to_string())
    );
    assert_eq!(config.user_agent, "test-agent/1.0");
}

#[test]
fn test_config_from_tap_config() {
    let tap = crate::config::TapConfig::from_value(json!({
        "api_token": "t",
        "query": "",
        "start_date": "2023-01-01T00:00:00Z",
        "user_agent": "my-agent",
        "max_retries": 3,
        "backoff_factor": 0.5
    }))
    .unwrap();

    let config = HttpClientConfig::from_tap_config(&tap);
    assert_eq!(config.retry.max_attempts, 3);
    assert_eq!(config.retry.initial_backoff, Duration::from_millis(500));
    assert_eq!(config.user_agent, "my-agent");

    let client = HttpClient::from_tap_config(&tap).unwrap();
    assert_eq!(client.config().retry.max_attempts, 3);
}

#[tokio::test]
async fn test_get_sends_auth_and_user_agent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/alerts"))
        .and(header("Authorization", "GenieKey secret123"))
        .and(header("User-Agent", "tap-test/0.1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = HttpClientConfig::builder().user_agent("tap-test/0.1").build();
    let client = HttpClient::with_auth(config, Authenticator::genie_key("secret123")).unwrap();

    let response = client
        .get(&format!("{}/v2/alerts", mock_server.uri()), &[])
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.body, json!({"data": []}));
}

#[tokio::test]
async fn test_get_query_params() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/alerts"))
        .and(query_param("query", "status:open updatedAt>1672531200"))
        .and(query_param("limit", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(&mock_server)
        .await;

    let client = HttpClient::with_config(fast_config()).unwrap();
    let response = client
        .get(
            &format!("{}/alerts", mock_server.uri()),
            &[
                ("query", "status:open updatedAt>1672531200".to_string()),
                ("limit", "100".to_string()),
            ],
        )
        .await
        .unwrap();

    assert!(response.url.contains("limit=100"));
}

#[tokio::test]
async fn test_response_headers_exposed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-Paging-Next", "https://example.com/next")
                .set_body_json(json!({})),
        )
        .mount(&mock_server)
        .await;

    let client = HttpClient::with_config(fast_config()).unwrap();
    let response = client.get(&mock_server.uri(), &[]).await.unwrap();

    assert_eq!(
        response.header("X-Paging-Next"),
        Some("https://example.com/next")
    );
    assert_eq!(response.header("X-Missing"), None);
}

#[tokio::test]
async fn test_retry_transient_then_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&mock_server)
        .await;

    let client = HttpClient::with_config(fast_config()).unwrap();
    let response = client
        .get(&format!("{}/flaky", mock_server.uri()), &[])
        .await
        .unwrap();

    assert_eq!(response.body["ok"], true);
    assert_eq!(request_count(&mock_server).await, 3);
}

#[tokio::test]
async fn test_client_error_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .mount(&mock_server)
        .await;

    let client = HttpClient::with_config(fast_config()).unwrap();
    let err = client
        .get(&format!("{}/missing", mock_server.uri()), &[])
        .await
        .unwrap_err();

    match err {
        Error::HttpStatus {
            method,
            url,
            status,
            body,
        } => {
            assert_eq!(method, "GET");
            assert!(url.ends_with("/missing"));
            assert_eq!(status, 404);
            assert_eq!(body, "Not Found");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(request_count(&mock_server).await, 1);
}

#[tokio::test]
async fn test_rate_limited_response_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&mock_server)
        .await;

    let client = HttpClient::with_config(fast_config()).unwrap();
    let err = client.get(&mock_server.uri(), &[]).await.unwrap_err();

    assert_eq!(err.status(), Some(429));
    assert_eq!(request_count(&mock_server).await, 1);
}

#[tokio::test]
async fn test_server_error_exhausts_retries() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&mock_server)
        .await;

    let client = HttpClient::with_config(fast_config()).unwrap();
    let err = client.get(&mock_server.uri(), &[]).await.unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert_eq!(request_count(&mock_server).await, 5);
}

#[tokio::test]
async fn test_connection_error_is_retried() {
    // Nothing listens on port 1
    let uri = "http://127.0.0.1:1/alerts";

    let config = HttpClientConfig::builder()
        .retry(RetryPolicy::new(2, Duration::from_millis(1)))
        .build();
    let client = HttpClient::with_config(config).unwrap();
    let err = client.get(uri, &[]).await.unwrap_err();

    assert!(matches!(err, Error::Http(_)));
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_invalid_json_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&mock_server)
        .await;

    let client = HttpClient::with_config(fast_config()).unwrap();
    let err = client.get(&mock_server.uri(), &[]).await.unwrap_err();

    assert!(matches!(err, Error::Decode { .. }));
    assert_eq!(request_count(&mock_server).await, 1);
}
