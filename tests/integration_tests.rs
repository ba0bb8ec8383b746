//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: config file → HTTP requests → Singer
//! messages on the output channel → state file

use chrono::{TimeZone, Utc};
use clap::Parser;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tap_opsgenie::catalog::discover;
use tap_opsgenie::cli::{Cli, Runner};
use tap_opsgenie::config::TapConfig;
use tap_opsgenie::engine::SyncEngine;
use tap_opsgenie::http::HttpClient;
use tap_opsgenie::output::MessageWriter;
use tap_opsgenie::schema::bundled_schemas;
use tap_opsgenie::state::StateManager;
use tap_opsgenie::{parse_rfc3339, Error};
use tempfile::TempDir;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Helpers
// ============================================================================

fn write_config(dir: &TempDir, server: &MockServer) -> PathBuf {
    let path = dir.path().join("config.json");
    let config = json!({
        "api_token": "integration-token",
        "api_url": format!("{}/v2", server.uri()),
        "query": "alert",
        "start_date": "2023-01-01T00:00:00Z",
        "backoff_factor": 0.001
    });
    std::fs::write(&path, config.to_string()).unwrap();
    path
}

fn runner(args: &[&str]) -> Runner {
    let mut argv = vec!["tap-opsgenie"];
    argv.extend_from_slice(args);
    Runner::new(Cli::try_parse_from(argv).unwrap())
}

fn arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

fn parse_lines(out: &[u8]) -> Vec<Value> {
    String::from_utf8(out.to_vec())
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

fn two_alerts() -> Value {
    json!({
        "data": [
            {
                "id": "a-1",
                "tinyId": "1",
                "message": "Disk full",
                "createdAt": "2023-05-01T09:00:00.000Z",
                "updatedAt": "2023-05-01T10:00:00.000Z",
                "tags": ["disk"],
                "details": {"host": "db-1"}
            },
            {
                "id": "a-2",
                "tinyId": "2",
                "message": "CPU high",
                "createdAt": "2023-05-01T10:30:00.000Z",
                "updatedAt": "2023-05-01T11:00:00.000Z"
            }
        ],
        "took": 0.01,
        "requestId": "req-1"
    })
}

// ============================================================================
// End-to-end Tests
// ============================================================================

#[tokio::test]
async fn test_sync_end_to_end() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/alerts"))
        .and(header("Authorization", "GenieKey integration-token"))
        .and(query_param("query", "alert updatedAt>1672531200"))
        .and(query_param("offset", "0"))
        .and(query_param("limit", "100"))
        .and(query_param("sort", "updatedAt"))
        .and(query_param("order", "asc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(two_alerts()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, &server);
    let state = dir.path().join("state.json");

    let before = Utc::now();
    let mut out = Vec::new();
    runner(&["--config", arg(&config), "--state", arg(&state)])
        .run_to(&mut out)
        .await
        .unwrap();
    let after = Utc::now();

    let messages = parse_lines(&out);
    let kinds: Vec<&str> = messages.iter().map(|m| m["type"].as_str().unwrap()).collect();
    assert_eq!(kinds, vec!["SCHEMA", "RECORD", "RECORD", "STATE"]);

    assert_eq!(messages[0]["stream"], "alerts");
    assert_eq!(messages[1]["record"]["updatedAt"], "2023-05-01T10:00:00.000000Z");
    assert_eq!(messages[1]["record"]["createdAt"], "2023-05-01T09:00:00.000000Z");
    assert_eq!(messages[1]["record"]["details"], json!({"host": "db-1"}));
    assert_eq!(messages[2]["record"]["updatedAt"], "2023-05-01T11:00:00.000000Z");

    let persisted: Value = serde_json::from_str(&std::fs::read_to_string(&state).unwrap()).unwrap();
    let bookmark = persisted["bookmarks"]["alerts"]["updatedAt"].as_str().unwrap();
    assert!(bookmark.ends_with('Z'));

    let bookmark = parse_rfc3339(bookmark).unwrap();
    assert!(bookmark >= before - chrono::Duration::microseconds(1));
    assert!(bookmark <= after);
    assert_eq!(messages[3]["value"], persisted);
}

#[tokio::test]
async fn test_sync_with_fixed_clock() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/alerts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(two_alerts()))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let state_path = dir.path().join("state.json");

    let config = TapConfig::from_file(write_config(&dir, &server)).unwrap();
    let client = HttpClient::from_tap_config(&config).unwrap();
    let sync_start = Utc.with_ymd_and_hms(2023, 5, 1, 12, 0, 0).unwrap();

    let mut engine = SyncEngine::new(client, config, StateManager::from_file(&state_path).unwrap())
        .with_clock(move || sync_start);
    let catalog = discover(&bundled_schemas().unwrap()).with_all_selected();
    let mut writer = MessageWriter::new(Vec::new());
    engine.sync(&catalog, &mut writer).await.unwrap();

    assert_eq!(writer.counts().schema, 1);
    assert_eq!(writer.counts().record, 2);

    let persisted: Value =
        serde_json::from_str(&std::fs::read_to_string(&state_path).unwrap()).unwrap();
    assert_eq!(
        persisted,
        json!({"bookmarks": {"alerts": {"updatedAt": "2023-05-01T12:00:00.000000Z"}}})
    );
}

#[tokio::test]
async fn test_sync_follows_pages() {
    let server = MockServer::start().await;
    let next = |offset: u32| format!("{}/v2/alerts?offset={offset}&limit=100", server.uri());

    for (offset, next_url, tiny_id) in [
        ("0", Some(next(100)), "1"),
        ("100", Some(next(200)), "2"),
        ("200", None, "3"),
    ] {
        let mut response = ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"tinyId": tiny_id, "updatedAt": "2023-05-01T10:00:00Z"}]
        }));
        if let Some(url) = next_url {
            response = response.insert_header("X-Paging-Next", url.as_str());
        }

        Mock::given(method("GET"))
            .and(path("/v2/alerts"))
            .and(query_param("offset", offset))
            .respond_with(response)
            .expect(1)
            .mount(&server)
            .await;
    }

    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, &server);

    let mut out = Vec::new();
    runner(&["-c", arg(&config)]).run_to(&mut out).await.unwrap();

    let records: Vec<String> = parse_lines(&out)
        .into_iter()
        .filter(|m| m["type"] == "RECORD")
        .map(|m| m["record"]["tinyId"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(records, vec!["1", "2", "3"]);
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_resumes_from_state_file() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/alerts"))
        .and(query_param("query", "alert updatedAt>1682935200"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, &server);
    let state = dir.path().join("state.json");
    std::fs::write(
        &state,
        r#"{"bookmarks": {"alerts": {"updatedAt": "2023-05-01T10:00:00.000000Z"}}}"#,
    )
    .unwrap();

    let mut out = Vec::new();
    runner(&["-c", arg(&config), "-s", arg(&state)])
        .run_to(&mut out)
        .await
        .unwrap();
}

// ============================================================================
// Failure Tests
// ============================================================================

#[tokio::test]
async fn test_client_error_fails_run() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, &server);
    let state = dir.path().join("state.json");

    let mut out = Vec::new();
    let err = runner(&["-c", arg(&config), "-s", arg(&state)])
        .run_to(&mut out)
        .await
        .unwrap_err();

    match err {
        Error::HttpStatus { status, body, .. } => {
            assert_eq!(status, 404);
            assert_eq!(body, "Not Found");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!state.exists());
}

#[tokio::test]
async fn test_binary_exits_nonzero_on_client_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, &server);
    let state = dir.path().join("state.json");

    let output = tokio::process::Command::new(env!("CARGO_BIN_EXE_tap-opsgenie"))
        .args(["-c", arg(&config), "-s", arg(&state)])
        .env("RUST_LOG", "info")
        .output()
        .await
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
    assert!(!state.exists());

    // SCHEMA goes out before the first request; nothing follows it
    let lines = parse_lines(&output.stdout);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["type"], "SCHEMA");
    assert!(String::from_utf8_lossy(&output.stderr).contains("404"));
}

#[tokio::test]
async fn test_server_errors_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(two_alerts()))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, &server);

    let mut out = Vec::new();
    runner(&["-c", arg(&config)]).run_to(&mut out).await.unwrap();

    assert_eq!(server.received_requests().await.unwrap().len(), 3);
    assert_eq!(parse_lines(&out).len(), 4);
}

#[tokio::test]
async fn test_missing_config_keys() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.json");
    std::fs::write(&config, r#"{"query": "alert"}"#).unwrap();

    let err = runner(&["-c", arg(&config)])
        .run_to(Vec::new())
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Config is missing required keys: api_token, start_date"
    );
}

// ============================================================================
// Discovery and Catalog Tests
// ============================================================================

#[tokio::test]
async fn test_discover_mode() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, &server);

    let mut out = Vec::new();
    runner(&["-c", arg(&config), "--discover"])
        .run_to(&mut out)
        .await
        .unwrap();

    let catalog: Value = serde_json::from_slice(&out).unwrap();
    let streams = catalog["streams"].as_array().unwrap();
    assert_eq!(streams.len(), 1);
    assert_eq!(streams[0]["tap_stream_id"], "alerts");
    assert_eq!(streams[0]["key_properties"], json!(["tinyId"]));
    assert_eq!(streams[0]["replication_key"], "updatedAt");
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unselected_catalog_syncs_nothing() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, &server);

    let catalog_path = dir.path().join("catalog.json");
    let mut catalog_file = std::fs::File::create(&catalog_path).unwrap();
    discover(&bundled_schemas().unwrap())
        .dump(&mut catalog_file)
        .unwrap();

    let mut out = Vec::new();
    runner(&["-c", arg(&config), "--catalog", arg(&catalog_path)])
        .run_to(&mut out)
        .await
        .unwrap();

    assert!(out.is_empty());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_custom_schemas_dir() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(two_alerts()))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, &server);
    let schemas = dir.path().join("schemas");
    std::fs::create_dir(&schemas).unwrap();
    std::fs::write(
        schemas.join("alerts.json"),
        json!({
            "type": "object",
            "properties": {
                "tinyId": {"type": "string"},
                "updatedAt": {"type": "string", "format": "date-time"}
            }
        })
        .to_string(),
    )
    .unwrap();

    let mut out = Vec::new();
    runner(&["-c", arg(&config), "--schemas-dir", arg(&schemas)])
        .run_to(&mut out)
        .await
        .unwrap();

    let messages = parse_lines(&out);
    assert_eq!(
        messages[0]["schema"]["properties"]
            .as_object()
            .unwrap()
            .len(),
        2
    );
    // Fields outside the custom schema pass through untouched
    assert_eq!(messages[1]["record"]["createdAt"], "2023-05-01T09:00:00.000Z");
    assert_eq!(messages[1]["record"]["updatedAt"], "2023-05-01T10:00:00.000000Z");
}
