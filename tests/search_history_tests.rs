//! Integration tests for search and version history.

mod common;

use common::{branch_json, version_json, TestEnv, TS};
use onyx_sdk::{
    CreateBranchRequest, CreateVersionRequest, Diff, EdgeType, MergeBranchRequest, OnyxError,
    ResultSource, SearchRequest,
};
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, ResponseTemplate};

// =============================================================================
// Search
// =============================================================================

#[tokio::test]
async fn test_search_sends_minimal_body_and_keeps_server_order() {
    let env = TestEnv::new().await;
    let (low, high) = (Uuid::new_v4(), Uuid::new_v4());

    Mock::given(method("POST"))
        .and(path("/api/search"))
        .and(body_json(json!({ "embedding": [0.1, 0.2, 0.3], "top_k": 5 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {
                    "node_id": low, "name": "a", "content": "fn a() {}",
                    "source": "GraphTraversal", "score": 0.2, "depth": 1,
                    "edge_path": ["Calls"], "versions": []
                },
                {
                    "node_id": high, "name": "b", "content": "fn b() {}",
                    "source": "VectorSearch", "score": 0.9, "depth": 0,
                    "edge_path": [], "versions": [{
                        "version_id": "v-1", "timestamp": TS, "lines_changed": 3
                    }]
                }
            ],
            "nodes_examined": 40,
            "query_time_ms": 7
        })))
        .expect(1)
        .mount(&env.server)
        .await;

    let resp = env
        .client
        .search()
        .query(SearchRequest::new(vec![0.1, 0.2, 0.3]).top_k(5))
        .await
        .unwrap();

    let ids: Vec<Uuid> = resp.items.iter().map(|i| i.node_id).collect();
    assert_eq!(ids, vec![low, high]);
    assert_eq!(resp.items[0].edge_path, vec![EdgeType::Calls]);
    assert_eq!(resp.items[1].source, ResultSource::VectorSearch);
    assert_eq!(resp.items[1].versions[0].lines_changed, 3);
    assert_eq!(resp.nodes_examined, 40);
    assert_eq!(resp.query_time_ms, 7);
}

#[tokio::test]
async fn test_search_with_empty_embedding_is_rejected_locally() {
    let env = TestEnv::new().await;
    let err = env
        .client
        .search()
        .query(SearchRequest::new(Vec::new()))
        .await
        .unwrap_err();
    assert!(matches!(err, OnyxError::Validation(_)));
    assert!(env.server.received_requests().await.unwrap().is_empty());
}

// =============================================================================
// Versions
// =============================================================================

#[tokio::test]
async fn test_create_and_get_version() {
    let env = TestEnv::new().await;
    let entity = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/api/versions"))
        .and(body_json(json!({
            "entity_id": entity,
            "diff": { "type": "Initial", "content": "fn a() {}" },
            "message": "first"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(version_json("v-1", entity, None)))
        .expect(1)
        .mount(&env.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/versions/v-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(version_json("v-1", entity, None)))
        .expect(1)
        .mount(&env.server)
        .await;

    let history = env.client.history();
    let created = history
        .create_version(CreateVersionRequest::new(entity, Diff::initial("fn a() {}")).message("first"))
        .await
        .unwrap();
    let fetched = history.get_version("v-1").await.unwrap();
    assert_eq!(created, fetched);
    assert!(fetched.is_initial());
}

#[tokio::test]
async fn test_list_versions_and_content_passthrough() {
    let env = TestEnv::new().await;
    let entity = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path(format!("/api/entities/{entity}/versions")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "versions": [
                version_json("v-1", entity, None),
                version_json("v-2", entity, Some("v-1"))
            ],
            "total": 2
        })))
        .mount(&env.server)
        .await;

    // Not JSON: must come back byte-for-byte.
    let raw = "fn a() {\n    \"quoted\"\n}\n";
    Mock::given(method("GET"))
        .and(path(format!("/api/entities/{entity}/versions/v-2/content")))
        .respond_with(ResponseTemplate::new(200).set_body_string(raw))
        .mount(&env.server)
        .await;

    let history = env.client.history();
    let list = history.list_versions(entity).await.unwrap();
    assert_eq!(list.total, 2);
    assert_eq!(list.versions[1].parent_version.as_deref(), Some("v-1"));

    let content = history.get_content_at_version(entity, "v-2").await.unwrap();
    assert_eq!(content, raw);
}

#[tokio::test]
async fn test_dot_and_empty_ids_never_reach_server() {
    let env = TestEnv::new().await;
    let history = env.client.history();
    let entity = Uuid::new_v4();

    for bad in ["", ".", ".."] {
        assert!(
            matches!(history.get_version(bad).await, Err(OnyxError::Validation(_))),
            "get_version({bad:?})"
        );
        assert!(
            matches!(
                history.get_content_at_version(entity, bad).await,
                Err(OnyxError::Validation(_))
            ),
            "get_content_at_version({bad:?})"
        );
        assert!(
            matches!(history.get_branch(bad).await, Err(OnyxError::Validation(_))),
            "get_branch({bad:?})"
        );
    }
    assert!(env.server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_path_like_ids_stay_inside_their_segment() {
    let env = TestEnv::new().await;
    let entity = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/api/versions/..%2Fnodes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(version_json("../nodes", entity, None)))
        .expect(1)
        .mount(&env.server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/api/entities/{entity}/versions/v%5C..%5C../content")))
        .respond_with(ResponseTemplate::new(200).set_body_string("fn a() {}"))
        .expect(1)
        .mount(&env.server)
        .await;

    let history = env.client.history();
    assert_eq!(history.get_version("../nodes").await.unwrap().version_id, "../nodes");
    assert_eq!(
        history
            .get_content_at_version(entity, "v\\..\\..")
            .await
            .unwrap(),
        "fn a() {}"
    );
}

// =============================================================================
// Branches
// =============================================================================

#[tokio::test]
async fn test_branch_lifecycle() {
    let env = TestEnv::new().await;
    let entity = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/api/branches"))
        .and(body_json(json!({ "name": "feature", "base_version": "v-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(branch_json("feature", "v-1", "v-1")))
        .expect(1)
        .mount(&env.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/branches/feature"))
        .respond_with(ResponseTemplate::new(200).set_body_json(branch_json("feature", "v-3", "v-1")))
        .mount(&env.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/branches"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "branches": [branch_json("main", "v-2", "v-1"), branch_json("feature", "v-3", "v-1")]
        })))
        .mount(&env.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/branches/merge"))
        .and(body_json(json!({ "source": "feature", "target": "main" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "version_id": "v-4",
            "entity_id": entity,
            "parent_version": "v-2",
            "diff": { "type": "Composite", "diffs": [
                { "type": "ContentChanged", "patch": "+x", "additions": 1, "deletions": 0 },
                { "type": "MetadataChanged", "changed_fields": { "owner": ["a", "b"] } }
            ]},
            "message": "merge feature into main",
            "timestamp": TS
        })))
        .expect(1)
        .mount(&env.server)
        .await;

    let history = env.client.history();

    let created = history
        .create_branch(CreateBranchRequest::new("feature", "v-1"))
        .await
        .unwrap();
    assert!(!created.is_merged());

    assert_eq!(history.get_branch("feature").await.unwrap().head, "v-3");
    assert_eq!(history.list_branches().await.unwrap().branches.len(), 2);

    let merged = history
        .merge_branch(MergeBranchRequest::new("feature", "main"))
        .await
        .unwrap();
    assert_eq!(merged.version_id, "v-4");
    assert_eq!(merged.branch, "main");
    match merged.diff {
        Diff::Composite { diffs } => assert_eq!(diffs.len(), 2),
        other => panic!("expected composite diff, got {other:?}"),
    }
}

#[tokio::test]
async fn test_branch_names_with_slashes_are_accepted() {
    let env = TestEnv::new().await;

    Mock::given(method("POST"))
        .and(path("/api/branches"))
        .and(body_json(json!({ "name": "feature/new-api", "base_version": "v-1" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(branch_json("feature/new-api", "v-1", "v-1")),
        )
        .expect(1)
        .mount(&env.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/branches/feature%2Fnew-api"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(branch_json("feature/new-api", "v-2", "v-1")),
        )
        .expect(1)
        .mount(&env.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/branches/merge"))
        .and(body_json(json!({ "source": "feature/new-api", "target": "release 1.0" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(version_json("v-3", Uuid::new_v4(), Some("v-2"))))
        .expect(1)
        .mount(&env.server)
        .await;

    let history = env.client.history();
    history
        .create_branch(CreateBranchRequest::new("feature/new-api", "v-1"))
        .await
        .unwrap();
    assert_eq!(history.get_branch("feature/new-api").await.unwrap().head, "v-2");
    history
        .merge_branch(MergeBranchRequest::new("feature/new-api", "release 1.0"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_missing_branch_is_not_found() {
    let env = TestEnv::new().await;

    Mock::given(method("GET"))
        .and(path("/api/branches/gone"))
        .respond_with(ResponseTemplate::new(404).set_body_string("branch not found: gone"))
        .mount(&env.server)
        .await;

    let err = env.client.history().get_branch("gone").await.unwrap_err();
    assert_eq!(err.message(), Some("branch not found: gone"));
    assert!(err.is_not_found());
}
