//! Edge models — knowledge graph relationships.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use uuid::Uuid;

use super::node::Node;
use super::Validate;

/// A directed, typed edge connecting two nodes in the knowledge graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: Uuid,
    pub edge_type: EdgeType,
    pub source_id: Uuid,
    pub target_id: Uuid,
    /// Confidence score in `[0.0, 1.0]`, assigned by the server.
    pub confidence: f64,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    pub temporal: TemporalContext,
}

/// Relationship categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeType {
    Defines,
    Calls,
    Imports,
    Documents,
    TestsOf,
    VersionedBy,
    Contains,
    Implements,
    DependsOn,
    Configures,
}

impl FromStr for EdgeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(&['-', '_'][..], "").as_str() {
            "defines" => Ok(EdgeType::Defines),
            "calls" => Ok(EdgeType::Calls),
            "imports" => Ok(EdgeType::Imports),
            "documents" => Ok(EdgeType::Documents),
            "testsof" | "tests" => Ok(EdgeType::TestsOf),
            "versionedby" => Ok(EdgeType::VersionedBy),
            "contains" => Ok(EdgeType::Contains),
            "implements" => Ok(EdgeType::Implements),
            "dependson" | "depends" => Ok(EdgeType::DependsOn),
            "configures" => Ok(EdgeType::Configures),
            _ => Err(format!("unknown edge type '{s}'")),
        }
    }
}

/// Temporal metadata tracking when a relationship was valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalContext {
    /// Version or commit marker where the relationship first appeared.
    #[serde(default)]
    pub since: Option<String>,
    /// Marker where the relationship ended (None = still valid).
    #[serde(default)]
    pub until: Option<String>,
    #[serde(default)]
    pub via_commit: Option<String>,
    pub since_timestamp: DateTime<Utc>,
    #[serde(default)]
    pub until_timestamp: Option<DateTime<Utc>>,
}

impl TemporalContext {
    /// Whether the relationship is still in effect.
    pub fn is_current(&self) -> bool {
        self.until.is_none() && self.until_timestamp.is_none()
    }
}

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for creating an edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateEdgeRequest {
    pub edge_type: EdgeType,
    pub source_id: Uuid,
    pub target_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, String>>,
}

impl CreateEdgeRequest {
    /// Create a new edge request.
    pub fn new(edge_type: EdgeType, source_id: Uuid, target_id: Uuid) -> Self {
        Self {
            edge_type,
            source_id,
            target_id,
            confidence: None,
            metadata: None,
        }
    }

    /// Set the confidence score.
    pub fn confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    /// Set metadata.
    pub fn metadata(mut self, metadata: HashMap<String, String>) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Response for listing edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListEdgesResponse {
    pub edges: Vec<Edge>,
    pub total: usize,
}

/// A neighbor result from graph traversal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeighborResult {
    pub edge: Edge,
    pub node: Node,
}

impl Validate for NeighborResult {
    fn validate(&self) -> Result<(), String> {
        self.node.validate()
    }
}

/// Result of a multi-hop graph traversal: visited node ids with their depth.
///
/// Mirrors the server's traversal output. No endpoint returns it on its own
/// yet; it is kept so callers can decode traversal payloads the server embeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraversalResult {
    pub nodes: Vec<(Uuid, usize)>,
    pub edges_followed: usize,
}

/// Result of a subgraph extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubgraphResult {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Validate for SubgraphResult {
    fn validate(&self) -> Result<(), String> {
        self.nodes.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_request_omits_unset_confidence_and_metadata() {
        let source = Uuid::new_v4();
        let target = Uuid::new_v4();
        let req = CreateEdgeRequest::new(EdgeType::Calls, source, target);
        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(
            body,
            json!({
                "edge_type": "Calls",
                "source_id": source.to_string(),
                "target_id": target.to_string(),
            })
        );
    }

    #[test]
    fn edge_round_trips() {
        let edge = Edge {
            id: Uuid::new_v4(),
            edge_type: EdgeType::TestsOf,
            source_id: Uuid::new_v4(),
            target_id: Uuid::new_v4(),
            confidence: 0.75,
            metadata: HashMap::from([("origin".to_string(), "ingest".to_string())]),
            temporal: TemporalContext {
                since: Some("v-1".to_string()),
                until: None,
                via_commit: Some("abc123".to_string()),
                since_timestamp: "2024-03-10T09:00:00Z".parse().unwrap(),
                until_timestamp: None,
            },
        };
        let decoded: Edge = serde_json::from_str(&serde_json::to_string(&edge).unwrap()).unwrap();
        assert_eq!(decoded, edge);
        assert!(decoded.temporal.is_current());
    }

    fn node(name: &str) -> Node {
        serde_json::from_value(json!({
            "id": Uuid::new_v4(),
            "node_type": { "type": "Test" },
            "name": name,
            "content": "#[test] fn it_works() {}",
            "content_hash": "c4ca4238",
            "metadata": { "suite": "unit" },
            "embedding": [0.5, -0.25],
            "created_at": "2024-03-10T09:00:00Z",
            "updated_at": "2024-03-11T09:00:00Z",
            "extension": { "type": "Test", "test_kind": "Unit" }
        }))
        .unwrap()
    }

    fn edge_between(source: Uuid, target: Uuid) -> Edge {
        Edge {
            id: Uuid::new_v4(),
            edge_type: EdgeType::Calls,
            source_id: source,
            target_id: target,
            confidence: 1.0,
            metadata: HashMap::new(),
            temporal: TemporalContext {
                since: None,
                until: Some("v-9".to_string()),
                via_commit: None,
                since_timestamp: "2024-03-10T09:00:00Z".parse().unwrap(),
                until_timestamp: Some("2024-04-01T00:00:00Z".parse().unwrap()),
            },
        }
    }

    #[test]
    fn subgraph_round_trips() {
        let (a, b) = (node("a"), node("b"));
        let sub = SubgraphResult {
            edges: vec![edge_between(a.id, b.id)],
            nodes: vec![a, b],
        };
        let decoded: SubgraphResult =
            serde_json::from_str(&serde_json::to_string(&sub).unwrap()).unwrap();
        assert_eq!(decoded, sub);
        assert!(decoded.validate().is_ok());
        assert!(!decoded.edges[0].temporal.is_current());
    }

    #[test]
    fn neighbor_and_edge_list_round_trip() {
        let n = node("callee");
        let neighbor = NeighborResult {
            edge: edge_between(Uuid::new_v4(), n.id),
            node: n,
        };
        let decoded: NeighborResult =
            serde_json::from_str(&serde_json::to_string(&neighbor).unwrap()).unwrap();
        assert_eq!(decoded, neighbor);

        let list = ListEdgesResponse {
            edges: vec![neighbor.edge.clone()],
            total: 1,
        };
        let decoded: ListEdgesResponse =
            serde_json::from_str(&serde_json::to_string(&list).unwrap()).unwrap();
        assert_eq!(decoded, list);
    }

    #[test]
    fn traversal_encodes_pairs_as_arrays() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let traversal = TraversalResult {
            nodes: vec![(a, 0), (b, 2)],
            edges_followed: 3,
        };
        let value = serde_json::to_value(&traversal).unwrap();
        assert_eq!(
            value,
            json!({ "nodes": [[a, 0], [b, 2]], "edges_followed": 3 })
        );
        let decoded: TraversalResult = serde_json::from_value(value).unwrap();
        assert_eq!(decoded, traversal);
    }

    #[test]
    fn edge_type_parses_common_spellings() {
        assert_eq!("depends-on".parse::<EdgeType>(), Ok(EdgeType::DependsOn));
        assert_eq!("TestsOf".parse::<EdgeType>(), Ok(EdgeType::TestsOf));
        assert_eq!("calls".parse::<EdgeType>(), Ok(EdgeType::Calls));
        assert!("likes".parse::<EdgeType>().is_err());
    }
}
