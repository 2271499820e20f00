use std::sync::Arc;

use incident_core::IncidentStore;
use incident_core::MemoryIncidentStore;
use incident_test_support::FailingStore;
use incident_test_support::ScriptedClassifier;
use incident_test_support::classifier_server;
use incident_test_support::unreachable_url;
use pretty_assertions::assert_eq;
use reqwest::StatusCode;
use serde_json::Value;
use serde_json::json;

use super::TestServer;
use super::http_classifier;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn disk_full_is_stored_and_escalated() {
    let classifier = classifier_server("infra", "critical").await;
    let store = Arc::new(MemoryIncidentStore::new());
    let server = TestServer::start(http_classifier(&classifier.uri()), store.clone()).await;

    let response = reqwest::Client::new()
        .post(server.url("/ingest"))
        .json(&json!({"message": "disk full"}))
        .send()
        .await
        .expect("request");

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("json body");
    assert_eq!(body["message"], "disk full");
    assert_eq!(body["category"], "infra");
    assert_eq!(body["severity"], "critical");
    assert_eq!(body["action"], "Escalate immediately");
    assert!(body["id"].as_i64().is_some_and(|id| id > 0), "{body}");
    assert!(body["created_at"].is_string(), "{body}");

    let stored = store.list_all().await.expect("list");
    assert_eq!(stored.len(), 1);
    assert_eq!(json!(stored[0].id), body["id"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn empty_message_is_a_bad_request() {
    let classifier = ScriptedClassifier::returning("infra", "critical");
    let store = Arc::new(MemoryIncidentStore::new());
    let server = TestServer::start(classifier.clone(), store.clone()).await;

    let response = reqwest::Client::new()
        .post(server.url("/ingest"))
        .json(&json!({"message": ""}))
        .send()
        .await
        .expect("request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.text().await.expect("text"), "Message required");
    assert_eq!(classifier.calls(), 0);
    assert!(store.is_empty().await);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn missing_or_malformed_bodies_are_bad_requests() {
    let classifier = ScriptedClassifier::returning("infra", "critical");
    let store = Arc::new(MemoryIncidentStore::new());
    let server = TestServer::start(classifier.clone(), store.clone()).await;
    let client = reqwest::Client::new();

    for body in [r#"{}"#, r#"{"message": null}"#, r#"{"message": 7}"#, "disk full", ""] {
        let response = client
            .post(server.url("/ingest"))
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .expect("request");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {body:?}");
    }

    assert_eq!(classifier.calls(), 0);
    assert!(store.is_empty().await);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn unreachable_classifier_is_a_server_error() {
    let store = Arc::new(MemoryIncidentStore::new());
    let server = TestServer::start(http_classifier(&unreachable_url()), store.clone()).await;

    let response = reqwest::Client::new()
        .post(server.url("/ingest"))
        .json(&json!({"message": "server down"}))
        .send()
        .await
        .expect("request");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let text = response.text().await.expect("text");
    assert!(text.starts_with("classification error"), "{text}");
    assert!(store.is_empty().await);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn storage_failure_is_a_server_error() {
    let classifier = ScriptedClassifier::returning("database", "high");
    let store = FailingStore::failing_inserts();
    let server = TestServer::start(classifier.clone(), store.clone()).await;

    let response = reqwest::Client::new()
        .post(server.url("/ingest"))
        .json(&json!({"message": "database timeout"}))
        .send()
        .await
        .expect("request");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let text = response.text().await.expect("text");
    assert!(text.starts_with("storage error"), "{text}");
    assert_eq!(classifier.calls(), 1);
    assert_eq!(store.stored_count().await, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn client_supplied_id_and_timestamp_are_ignored() {
    let store = Arc::new(MemoryIncidentStore::new());
    let server =
        TestServer::start(ScriptedClassifier::returning("infra", "critical"), store.clone()).await;

    let response = reqwest::Client::new()
        .post(server.url("/ingest"))
        .json(&json!({
            "message": "disk full",
            "id": 999,
            "created_at": "1999-01-01T00:00:00Z",
        }))
        .send()
        .await
        .expect("request");

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("json body");
    assert_eq!(body["id"], json!(1));
    assert_ne!(body["created_at"], json!("1999-01-01T00:00:00Z"));

    let stored = store.list_all().await.expect("list");
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, 1);
    assert!(stored[0].created_at.timestamp() > 946_684_800, "{:?}", stored[0]);
    assert_eq!(json!(stored[0].created_at), body["created_at"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn ingest_only_accepts_post() {
    let server = TestServer::start(
        ScriptedClassifier::returning("api", "high"),
        Arc::new(MemoryIncidentStore::new()),
    )
    .await;

    let response = reqwest::get(server.url("/ingest")).await.expect("request");
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
