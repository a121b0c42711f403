//! End-to-end checks of trace propagation and the response envelope.

mod common;

use std::collections::HashSet;

use reqwest::StatusCode;
use serde_json::{json, Value};

use phone_inventory::config::{LogRotation, LoggingConfig};
use phone_inventory::observability::logging;

fn trace_header(response: &reqwest::Response) -> String {
    response
        .headers()
        .get("x-trace-id")
        .expect("trace header")
        .to_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_generated_trace_ids_are_distinct() {
    let server = common::spawn_server().await;
    let mut seen = HashSet::new();
    for _ in 0..20 {
        let response = server.client.get(server.url("/health")).send().await.unwrap();
        let id = trace_header(&response);
        assert!(!id.is_empty());
        assert!(seen.insert(id));
    }
}

#[tokio::test]
async fn test_inbound_trace_id_echoed_verbatim() {
    let server = common::spawn_server().await;
    for value in ["abc", "Upstream-Trace-0001", "a.b/c:d"] {
        let response = server
            .client
            .get(server.url("/phone"))
            .header("X-Trace-Id", value)
            .send()
            .await
            .unwrap();
        assert_eq!(trace_header(&response), value);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["traceId"], value);
    }
}

#[tokio::test]
async fn test_success_body_carries_header_trace_id() {
    let server = common::spawn_server().await;
    let response = server.client.get(server.url("/phone")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let header = trace_header(&response);
    let body: Value = response.json().await.unwrap();

    let object = body.as_object().unwrap();
    let mut keys: Vec<_> = object.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, ["data", "success", "traceId"]);
    assert_eq!(body["success"], true);
    assert_eq!(body["traceId"], header.as_str());
}

#[tokio::test]
async fn test_failure_body_shape() {
    let server = common::spawn_server().await;
    let requests = [
        server.client.get(server.url("/nowhere")),
        server.client.patch(server.url("/phone/999")).json(&json!({"stock": 1})),
        server.client.post(server.url("/phone/add")).json(&json!({"bogus": 1})),
        server.client.put(server.url("/phone")),
    ];

    for request in requests {
        let response = request.send().await.unwrap();
        assert!(response.status().is_client_error() || response.status().is_server_error());
        assert!(!trace_header(&response).is_empty());
        let body: Value = response.json().await.unwrap();
        let object = body.as_object().unwrap();
        let mut keys: Vec<_> = object.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, ["message", "success"]);
        assert_eq!(body["success"], false);
    }
}

#[tokio::test]
async fn test_failure_trace_id_when_enabled() {
    let server = common::spawn_with(|config| config.envelope.trace_id_on_failure = true).await;
    let response = server
        .client
        .get(server.url("/nowhere"))
        .header("x-trace-id", "fail-1")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body,
        json!({"success": false, "message": "Cannot GET /nowhere", "traceId": "fail-1"})
    );
}

#[tokio::test]
async fn test_custom_trace_headers() {
    let server = common::spawn_with(|config| {
        config.trace.inbound_header = "x-correlation-id".to_string();
        config.trace.outbound_header = "x-request-trace".to_string();
    })
    .await;
    let response = server
        .client
        .get(server.url("/health"))
        .header("x-correlation-id", "corr-9")
        .send()
        .await
        .unwrap();
    assert_eq!(response.headers()["x-request-trace"], "corr-9");
    assert!(response.headers().get("x-trace-id").is_none());
}

#[tokio::test]
async fn test_requests_complete_with_file_logging() {
    let dir = tempfile::tempdir().unwrap();
    let guard = logging::init(&LoggingConfig {
        level: "debug".into(),
        console: false,
        json: false,
        file: true,
        directory: dir.path().to_string_lossy().into_owned(),
        rotation: LogRotation::Never,
        max_files: 2,
    })
    .unwrap();

    let server = common::spawn_server().await;
    let ok = server
        .client
        .get(server.url("/health"))
        .header("x-trace-id", "logged-ok")
        .send()
        .await
        .unwrap();
    assert_eq!(ok.status(), StatusCode::OK);
    let missing = server
        .client
        .delete(server.url("/phone/41"))
        .header("x-trace-id", "logged-missing")
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    drop(server);
    guard.shutdown();

    let logs: String = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(Result::ok)
        .map(|entry| std::fs::read_to_string(entry.path()).unwrap_or_default())
        .collect();
    assert!(logs.contains("[logged-ok] HealthController.check - GET /health - started"));
    assert!(logs.contains("[logged-missing] PhoneController.remove - failed after"));
    assert!(logs.contains("[logged-missing] Global error"));
}
