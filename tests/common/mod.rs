//! Shared fixtures for the SDK integration tests.
//!
//! Every test runs against its own wiremock server so request expectations
//! never leak between tests.

#![allow(dead_code)]

use onyx_sdk::OnyxClient;
use serde_json::{json, Value};
use uuid::Uuid;
use wiremock::MockServer;

pub const TS: &str = "2024-05-01T12:00:00Z";

/// A mock server plus a client pointed at it.
pub struct TestEnv {
    pub server: MockServer,
    pub client: OnyxClient,
}

impl TestEnv {
    pub async fn new() -> Self {
        let server = MockServer::start().await;
        let client = OnyxClient::builder(&server.uri())
            .build()
            .expect("Failed to build client");
        Self { server, client }
    }

    pub async fn with_api_key(key: &str) -> Self {
        let server = MockServer::start().await;
        let client = OnyxClient::builder(&server.uri())
            .api_key(key)
            .build()
            .expect("Failed to build client");
        Self { server, client }
    }

    pub async fn with_timeout(secs: u64) -> Self {
        let server = MockServer::start().await;
        let client = OnyxClient::builder(&server.uri())
            .timeout(secs)
            .build()
            .expect("Failed to build client");
        Self { server, client }
    }

    /// Body of the only request the server received, as JSON.
    pub async fn single_request_body(&self) -> Value {
        let requests = self
            .server
            .received_requests()
            .await
            .expect("request recording is enabled");
        assert_eq!(requests.len(), 1, "expected exactly one request");
        serde_json::from_slice(&requests[0].body).expect("request body is JSON")
    }
}

/// A server-shaped node with no optional fields.
pub fn node_json(id: Uuid, name: &str) -> Value {
    json!({
        "id": id,
        "node_type": { "type": "CodeEntity", "kind": "Function" },
        "name": name,
        "content": format!("fn {name}() {{}}"),
        "content_hash": "9f86d081884c7d65",
        "created_at": TS,
        "updated_at": TS
    })
}

pub fn edge_json(id: Uuid, source: Uuid, target: Uuid) -> Value {
    json!({
        "id": id,
        "edge_type": "Calls",
        "source_id": source,
        "target_id": target,
        "confidence": 0.9,
        "metadata": {},
        "temporal": { "since_timestamp": TS }
    })
}

pub fn version_json(version_id: &str, entity: Uuid, parent: Option<&str>) -> Value {
    json!({
        "version_id": version_id,
        "entity_id": entity,
        "parent_version": parent,
        "branch": "main",
        "diff": { "type": "ContentChanged", "patch": "-a\n+b", "additions": 1, "deletions": 1 },
        "commit_id": null,
        "author": "dev@example.com",
        "message": "tweak",
        "timestamp": TS
    })
}

pub fn branch_json(name: &str, head: &str, base: &str) -> Value {
    json!({
        "name": name,
        "head": head,
        "base": base,
        "created_at": TS,
        "merged_into": null
    })
}
