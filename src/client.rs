//! Top-level client and sub-clients for the Onyx API.
//!
//! The main entry point is [`OnyxClient`], built from a [`ClientConfig`] or
//! via [`OnyxClientBuilder`]. It owns the [`Transport`]; each sub-client
//! borrows it for as long as the client lives.

use std::path::Path;
use tracing::debug;
use uuid::Uuid;

use crate::config::{ClientConfig, DEFAULT_TIMEOUT_SECS};
use crate::error::{OnyxError, OnyxResult};
use crate::models::*;
use crate::transport::Transport;

/// Reject identifiers that cannot stand as a single path segment. Anything
/// else is percent-encoded by the transport.
fn check_segment(what: &str, value: &str) -> OnyxResult<()> {
    match value {
        "" => Err(OnyxError::Validation(format!("{what} must not be empty"))),
        "." | ".." => Err(OnyxError::Validation(format!(
            "{what} '{value}' is not a valid identifier"
        ))),
        _ => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// OnyxClient
// ---------------------------------------------------------------------------

/// The main Onyx API client.
///
/// ```rust,no_run
/// use onyx_sdk::{CreateNodeRequest, OnyxClient};
///
/// # async fn example() -> Result<(), onyx_sdk::OnyxError> {
/// let client = OnyxClient::builder("http://localhost:3000")
///     .api_key("sk-...")
///     .build()?;
///
/// let node = client.nodes().create(CreateNodeRequest::new("f", "fn f(){}")).await?;
/// client.close();
/// # Ok(())
/// # }
/// ```
///
/// The connection pool is released by [`close`](OnyxClient::close) or, on
/// any other exit path, when the client goes out of scope.
#[derive(Debug)]
pub struct OnyxClient {
    transport: Transport,
}

impl OnyxClient {
    /// Create a client from an explicit configuration.
    pub fn new(config: ClientConfig) -> OnyxResult<Self> {
        Ok(Self {
            transport: Transport::new(&config)?,
        })
    }

    /// Create a client from `onyx.toml` and `ONYX_*` environment variables.
    pub fn from_env() -> OnyxResult<Self> {
        Self::new(ClientConfig::load(None)?)
    }

    /// Create a client from a specific config file, still honouring the
    /// environment overrides.
    pub fn from_config_file(path: &Path) -> OnyxResult<Self> {
        Self::new(ClientConfig::load(Some(path))?)
    }

    /// Start building a new client.
    pub fn builder(base_url: &str) -> OnyxClientBuilder {
        OnyxClientBuilder {
            base_url: base_url.to_string(),
            api_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn base_url(&self) -> &url::Url {
        self.transport.base_url()
    }

    // -- Health ---------------------------------------------------------------

    /// Check whether the Onyx server is healthy.
    ///
    /// Never fails: any error (404, 5xx, network) is reported as `false`.
    pub async fn health(&self) -> bool {
        match self.transport.get(&["health"], &[]).await {
            Ok(_) => true,
            Err(err) => {
                debug!(error = %err, "health check failed");
                false
            }
        }
    }

    /// Release the connection pool. Sub-clients borrow the client, so none
    /// can be used afterwards:
    ///
    /// ```compile_fail
    /// # fn demo(client: onyx_sdk::OnyxClient) {
    /// let nodes = client.nodes();
    /// client.close();
    /// let _still_here = nodes;
    /// # }
    /// ```
    pub fn close(self) {
        debug!(base_url = %self.transport.base_url(), "closing onyx client");
    }

    // -- Sub-clients ----------------------------------------------------------

    /// Access node CRUD operations.
    pub fn nodes(&self) -> NodesClient<'_> {
        NodesClient {
            transport: &self.transport,
        }
    }

    /// Access edge CRUD operations.
    pub fn edges(&self) -> EdgesClient<'_> {
        EdgesClient {
            transport: &self.transport,
        }
    }

    /// Access semantic search.
    pub fn search(&self) -> SearchClient<'_> {
        SearchClient {
            transport: &self.transport,
        }
    }

    /// Access version history and branching.
    pub fn history(&self) -> HistoryClient<'_> {
        HistoryClient {
            transport: &self.transport,
        }
    }

    /// Access code ingestion.
    pub fn ingest(&self) -> IngestClient<'_> {
        IngestClient {
            transport: &self.transport,
        }
    }

    /// Access billing.
    pub fn billing(&self) -> BillingClient<'_> {
        BillingClient {
            transport: &self.transport,
        }
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for [`OnyxClient`].
#[derive(Debug)]
pub struct OnyxClientBuilder {
    base_url: String,
    api_key: Option<String>,
    timeout_secs: u64,
}

impl OnyxClientBuilder {
    /// Set the API key for authentication.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the request timeout in seconds (default: 30).
    pub fn timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Build the client.
    pub fn build(self) -> OnyxResult<OnyxClient> {
        OnyxClient::new(ClientConfig {
            base_url: self.base_url,
            api_key: self.api_key,
            timeout_secs: self.timeout_secs,
        })
    }
}

// ---------------------------------------------------------------------------
// NodesClient
// ---------------------------------------------------------------------------

/// Sub-client for node CRUD operations.
#[derive(Debug, Clone, Copy)]
pub struct NodesClient<'a> {
    transport: &'a Transport,
}

impl NodesClient<'_> {
    /// Create a new node.
    pub async fn create(&self, req: CreateNodeRequest) -> OnyxResult<Node> {
        let resp = self.transport.post(&["api", "nodes"], &req).await?;
        Transport::decode(resp).await
    }

    /// Get a node by ID.
    pub async fn get(&self, id: Uuid) -> OnyxResult<Node> {
        let id = id.to_string();
        let resp = self.transport.get(&["api", "nodes", id.as_str()], &[]).await?;
        Transport::decode(resp).await
    }

    /// Update an existing node. Fields left unset in `req` are not sent and
    /// keep their current value.
    pub async fn update(&self, id: Uuid, req: UpdateNodeRequest) -> OnyxResult<Node> {
        let id = id.to_string();
        let resp = self.transport.put(&["api", "nodes", id.as_str()], &req).await?;
        Transport::decode(resp).await
    }

    /// Delete a node and all its edges.
    pub async fn delete(&self, id: Uuid) -> OnyxResult<()> {
        let id = id.to_string();
        self.transport.delete(&["api", "nodes", id.as_str()]).await?;
        Ok(())
    }

    /// List nodes, one page at a time. `page` is 1-based.
    pub async fn list(&self, page: usize, per_page: usize) -> OnyxResult<ListNodesResponse> {
        if page == 0 {
            return Err(OnyxError::Validation("page starts at 1".to_string()));
        }
        if per_page == 0 {
            return Err(OnyxError::Validation("per_page must be positive".to_string()));
        }
        let query = [("page", page.to_string()), ("per_page", per_page.to_string())];
        let resp = self.transport.get(&["api", "nodes"], &query).await?;
        Transport::decode(resp).await
    }

    /// Get the neighbors of a node.
    pub async fn neighbors(&self, id: Uuid) -> OnyxResult<Vec<NeighborResult>> {
        let id = id.to_string();
        let resp = self
            .transport
            .get(&["api", "nodes", id.as_str(), "neighbors"], &[])
            .await?;
        Transport::decode(resp).await
    }

    /// Get a subgraph rooted at a node.
    pub async fn subgraph(&self, id: Uuid, depth: usize) -> OnyxResult<SubgraphResult> {
        let id = id.to_string();
        let query = [("depth", depth.to_string())];
        let resp = self
            .transport
            .get(&["api", "nodes", id.as_str(), "subgraph"], &query)
            .await?;
        Transport::decode(resp).await
    }
}

// ---------------------------------------------------------------------------
// EdgesClient
// ---------------------------------------------------------------------------

/// Sub-client for edge CRUD operations.
#[derive(Debug, Clone, Copy)]
pub struct EdgesClient<'a> {
    transport: &'a Transport,
}

impl EdgesClient<'_> {
    /// Create a new edge.
    pub async fn create(&self, req: CreateEdgeRequest) -> OnyxResult<Edge> {
        let resp = self.transport.post(&["api", "edges"], &req).await?;
        Transport::decode(resp).await
    }

    /// Get an edge by ID.
    pub async fn get(&self, id: Uuid) -> OnyxResult<Edge> {
        let id = id.to_string();
        let resp = self.transport.get(&["api", "edges", id.as_str()], &[]).await?;
        Transport::decode(resp).await
    }

    /// Delete an edge.
    pub async fn delete(&self, id: Uuid) -> OnyxResult<()> {
        let id = id.to_string();
        self.transport.delete(&["api", "edges", id.as_str()]).await?;
        Ok(())
    }

    /// List all edges.
    pub async fn list(&self) -> OnyxResult<ListEdgesResponse> {
        let resp = self.transport.get(&["api", "edges"], &[]).await?;
        Transport::decode(resp).await
    }
}

// ---------------------------------------------------------------------------
// SearchClient
// ---------------------------------------------------------------------------

/// Sub-client for semantic search operations.
#[derive(Debug, Clone, Copy)]
pub struct SearchClient<'a> {
    transport: &'a Transport,
}

impl SearchClient<'_> {
    /// Execute a semantic query. Items come back in the server's ranking
    /// order.
    pub async fn query(&self, req: SearchRequest) -> OnyxResult<SearchResponse> {
        if req.embedding.is_empty() {
            return Err(OnyxError::Validation(
                "query embedding must not be empty".to_string(),
            ));
        }
        let resp = self.transport.post(&["api", "search"], &req).await?;
        Transport::decode(resp).await
    }
}

// ---------------------------------------------------------------------------
// HistoryClient
// ---------------------------------------------------------------------------

/// Sub-client for version history and branching.
#[derive(Debug, Clone, Copy)]
pub struct HistoryClient<'a> {
    transport: &'a Transport,
}

impl HistoryClient<'_> {
    /// Record a new version.
    pub async fn create_version(&self, req: CreateVersionRequest) -> OnyxResult<VersionEntry> {
        let resp = self.transport.post(&["api", "versions"], &req).await?;
        Transport::decode(resp).await
    }

    /// Get a version by ID.
    pub async fn get_version(&self, version_id: &str) -> OnyxResult<VersionEntry> {
        check_segment("version id", version_id)?;
        let resp = self
            .transport
            .get(&["api", "versions", version_id], &[])
            .await?;
        Transport::decode(resp).await
    }

    /// List all versions for an entity.
    pub async fn list_versions(&self, entity_id: Uuid) -> OnyxResult<ListVersionsResponse> {
        let entity_id = entity_id.to_string();
        let resp = self
            .transport
            .get(&["api", "entities", entity_id.as_str(), "versions"], &[])
            .await?;
        Transport::decode(resp).await
    }

    /// Get the content of an entity at a specific version. The body is
    /// returned verbatim, not JSON-decoded.
    pub async fn get_content_at_version(
        &self,
        entity_id: Uuid,
        version_id: &str,
    ) -> OnyxResult<String> {
        check_segment("version id", version_id)?;
        let entity_id = entity_id.to_string();
        let resp = self
            .transport
            .get(
                &["api", "entities", entity_id.as_str(), "versions", version_id, "content"],
                &[],
            )
            .await?;
        Transport::text(resp).await
    }

    /// Create a new branch.
    pub async fn create_branch(&self, req: CreateBranchRequest) -> OnyxResult<Branch> {
        let resp = self.transport.post(&["api", "branches"], &req).await?;
        Transport::decode(resp).await
    }

    /// Get branch metadata.
    pub async fn get_branch(&self, name: &str) -> OnyxResult<Branch> {
        check_segment("branch name", name)?;
        let resp = self
            .transport
            .get(&["api", "branches", name], &[])
            .await?;
        Transport::decode(resp).await
    }

    /// List all branches.
    pub async fn list_branches(&self) -> OnyxResult<ListBranchesResponse> {
        let resp = self.transport.get(&["api", "branches"], &[]).await?;
        Transport::decode(resp).await
    }

    /// Merge a source branch into a target branch, returning the merge
    /// version.
    pub async fn merge_branch(&self, req: MergeBranchRequest) -> OnyxResult<VersionEntry> {
        let resp = self.transport.post(&["api", "branches", "merge"], &req).await?;
        Transport::decode(resp).await
    }
}

// ---------------------------------------------------------------------------
// IngestClient
// ---------------------------------------------------------------------------

/// Sub-client for code ingestion.
#[derive(Debug, Clone, Copy)]
pub struct IngestClient<'a> {
    transport: &'a Transport,
}

impl IngestClient<'_> {
    /// Ingest a single code unit.
    pub async fn ingest_unit(&self, req: IngestCodeUnitRequest) -> OnyxResult<IngestResult> {
        let resp = self.transport.post(&["api", "ingest", "unit"], &req).await?;
        Transport::decode(resp).await
    }

    /// Ingest an entire codebase in one request. The batch succeeds or
    /// fails as a whole; per-unit results are returned as the server sent
    /// them.
    pub async fn ingest_codebase(
        &self,
        req: IngestCodebaseRequest,
    ) -> OnyxResult<IngestCodebaseResponse> {
        let resp = self.transport.post(&["api", "ingest", "codebase"], &req).await?;
        Transport::decode(resp).await
    }
}

// ---------------------------------------------------------------------------
// BillingClient
// ---------------------------------------------------------------------------

/// Sub-client for billing, relayed to the payment provider by the server.
#[derive(Debug, Clone, Copy)]
pub struct BillingClient<'a> {
    transport: &'a Transport,
}

impl BillingClient<'_> {
    /// Create a checkout session.
    pub async fn create_checkout_session(
        &self,
        req: CheckoutSessionRequest,
    ) -> OnyxResult<CheckoutSessionResponse> {
        let resp = self.transport.post(&["billing", "checkout"], &req).await?;
        Transport::decode(resp).await
    }

    /// Create a billing portal session.
    pub async fn create_billing_portal(
        &self,
        req: BillingPortalRequest,
    ) -> OnyxResult<BillingPortalResponse> {
        let resp = self.transport.post(&["billing", "portal"], &req).await?;
        Transport::decode(resp).await
    }
}
