//! Integration tests for EcoLedger API endpoints
//!
//! These tests verify that the traceability endpoints respond with the
//! expected JSON envelopes for every action, alongside the chain, health
//! and stats endpoints.

use axum_test::TestServer;
use serde_json::{json, Value};
use std::sync::Arc;

use ecoledger::api::{build_api_router, Service};
use ecoledger::ledger::Ledger;

// Difficulty 1 keeps mining to a handful of hashes per append.
fn test_server(difficulty: u32) -> TestServer {
    let ledger = Ledger::new(difficulty).expect("Failed to create ledger");
    let service = Arc::new(Service::new(ledger));
    TestServer::new(build_api_router(service)).expect("Failed to create test server")
}

fn add_body(subject_key: &str, score: f64) -> Value {
    json!({
        "action": "add",
        "subjectKey": subject_key,
        "materialOrigin": "Oregon Forests",
        "certificationType": "FSC Certified",
        "certificationNumber": "FSC-1001",
        "sustainabilityScore": score,
    })
}

#[tokio::test]
async fn test_traceability_actions() {
    let server = test_server(1);

    // add mines a block and returns it
    let response = server
        .post("/api/traceability")
        .json(&add_body("pkg-1", 92.0))
        .await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    let record = &body["data"]["record"];
    assert_eq!(record["subjectKey"], "pkg-1");
    assert_eq!(record["certificationNumber"], "FSC-1001");
    assert_eq!(record["sustainabilityScore"], 92.0);
    assert!(record["hash"].as_str().unwrap().starts_with('0'));
    assert!(body["data"]["message"].is_string());

    // verify reports the mined record as valid
    let response = server
        .post("/api/traceability")
        .json(&json!({ "action": "verify", "subjectKey": "pkg-1" }))
        .await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["isValid"], true);
    assert_eq!(body["data"]["record"]["certificationNumber"], "FSC-1001");

    // verify on an unknown key is a structured miss, not an error
    let response = server
        .post("/api/traceability")
        .json(&json!({ "action": "verify", "subjectKey": "pkg-nonexistent" }))
        .await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["data"]["isValid"], false);
    assert!(body["data"]["record"].is_null());

    // get_chain returns the full chain with its length
    let response = server
        .post("/api/traceability")
        .json(&json!({ "action": "get_chain" }))
        .await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["length"], 2);
    assert_eq!(body["data"]["chain"].as_array().unwrap().len(), 2);

    // unknown action is rejected
    let response = server
        .post("/api/traceability")
        .json(&json!({ "action": "burn" }))
        .await;
    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Invalid action");

    // add with a missing field is rejected before touching the ledger
    let response = server
        .post("/api/traceability")
        .json(&json!({ "action": "add", "subjectKey": "pkg-2" }))
        .await;
    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_traceability_lookup() {
    let server = test_server(1);

    server
        .post("/api/traceability")
        .json(&add_body("pkg-7", 81.5))
        .await;

    let response = server
        .get("/api/traceability")
        .add_query_param("subjectKey", "pkg-7")
        .await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["isValid"], true);
    assert_eq!(body["data"]["record"]["sustainabilityScore"], 81.5);
    assert_eq!(body["data"]["chainLength"], 2);

    // unknown subject key
    let response = server
        .get("/api/traceability")
        .add_query_param("subjectKey", "pkg-missing")
        .await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["data"]["isValid"], false);
    assert!(body["data"]["record"].is_null());

    // missing query parameter
    let response = server.get("/api/traceability").await;
    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Subject key is required");
}

#[tokio::test]
async fn test_chain_block_endpoint() {
    let server = test_server(1);

    // index 0 is the genesis block
    let response = server.get("/api/chain/block/0").await;
    assert_eq!(response.status_code(), 200);
    let block: Value = response.json();
    assert_eq!(block["id"], "genesis");
    assert_eq!(
        block["subjectKey"],
        "00000000-0000-0000-0000-000000000000"
    );
    assert_eq!(block["hash"], "0".repeat(64));

    // out-of-range index
    let response = server.get("/api/chain/block/999").await;
    assert_eq!(response.status_code(), 404);
    let body: Value = response.json();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_system_endpoints() {
    let server = test_server(1);

    let response = server.get("/api/health").await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert!(body["timestamp"].is_string());

    server
        .post("/api/traceability")
        .json(&add_body("pkg-9", 70.0))
        .await;

    let response = server.get("/api/stats").await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert!(body["total_requests"].is_number());
    assert!(body["successful_requests"].is_number());
    assert!(body["failed_requests"].is_number());
    assert_eq!(body["records_appended"], 1);
    assert_eq!(body["chain_height"], 2);
    assert!(body["uptime_seconds"].is_number());
}
