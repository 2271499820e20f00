use std::sync::Arc;

use incident_core::MemoryIncidentStore;
use incident_test_support::FailingStore;
use incident_test_support::ScriptedClassifier;
use pretty_assertions::assert_eq;
use reqwest::StatusCode;
use serde_json::Value;
use serde_json::json;

use super::TestServer;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn empty_store_lists_an_empty_array() {
    let server = TestServer::start(
        ScriptedClassifier::returning("api", "high"),
        Arc::new(MemoryIncidentStore::new()),
    )
    .await;

    let response = reqwest::get(server.url("/incidents")).await.expect("request");

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("json body");
    assert_eq!(body, json!([]));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn incidents_are_listed_newest_first() {
    let server = TestServer::start(
        ScriptedClassifier::returning("storage", "medium"),
        Arc::new(MemoryIncidentStore::new()),
    )
    .await;
    let client = reqwest::Client::new();

    for message in ["A", "B", "C"] {
        let response = client
            .post(server.url("/ingest"))
            .json(&json!({"message": message}))
            .send()
            .await
            .expect("ingest");
        assert_eq!(response.status(), StatusCode::OK);
    }

    let body: Value = client
        .get(server.url("/incidents"))
        .send()
        .await
        .expect("request")
        .json()
        .await
        .expect("json body");
    let incidents = body.as_array().expect("array");
    let messages: Vec<&str> = incidents
        .iter()
        .filter_map(|incident| incident["message"].as_str())
        .collect();
    assert_eq!(messages, vec!["C", "B", "A"]);
    for incident in incidents {
        assert_eq!(incident["action"], "No action required");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn listing_failure_is_a_server_error() {
    let server = TestServer::start(
        ScriptedClassifier::returning("api", "high"),
        FailingStore::failing_everything(),
    )
    .await;

    let response = reqwest::get(server.url("/incidents")).await.expect("request");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let text = response.text().await.expect("text");
    assert!(text.starts_with("storage error"), "{text}");
}
