//! # Onyx SDK for Rust
//!
//! Typed async client for the **Onyx** knowledge store. Onyx combines
//! semantic search, knowledge graphs, and temporal versioning in a
//! graph-native vector memory system.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use onyx_sdk::{CodeEntityKind, CreateNodeRequest, NodeType, OnyxClient, SearchRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), onyx_sdk::OnyxError> {
//!     let client = OnyxClient::builder("http://localhost:3000")
//!         .api_key("your-api-key")
//!         .build()?;
//!
//!     println!("Server healthy: {}", client.health().await);
//!
//!     let node = client.nodes().create(
//!         CreateNodeRequest::new("MyFunction", "fn hello() { }")
//!             .node_type(NodeType::code_entity(CodeEntityKind::Function))
//!     ).await?;
//!
//!     let results = client.search().query(
//!         SearchRequest::new(vec![0.1, 0.2, 0.3]).top_k(5)
//!     ).await?;
//!     println!("{} results for {}", results.items.len(), node.name);
//!
//!     client.close();
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! | Sub-client | Access | Purpose |
//! |------------|--------|---------|
//! | [`NodesClient`] | `client.nodes()` | Node CRUD, neighbors, subgraphs |
//! | [`EdgesClient`] | `client.edges()` | Edge CRUD operations |
//! | [`SearchClient`] | `client.search()` | Vector similarity search |
//! | [`HistoryClient`] | `client.history()` | Version history & branching |
//! | [`IngestClient`] | `client.ingest()` | Code ingestion pipeline |
//! | [`BillingClient`] | `client.billing()` | Checkout & billing portal |
//!
//! All sub-clients share the one [`Transport`] owned by [`OnyxClient`].
//! Errors are reported through [`OnyxError`]; nothing is retried.

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod transport;

pub use client::{
    BillingClient, EdgesClient, HistoryClient, IngestClient, NodesClient, OnyxClient,
    OnyxClientBuilder, SearchClient,
};
pub use config::{ClientConfig, ConfigOverrides};
pub use error::{OnyxError, OnyxResult};
pub use models::*;
pub use transport::Transport;
