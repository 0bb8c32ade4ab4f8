//! Node models — knowledge graph vertices.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::patch::Patch;
use super::Validate;

// ---------------------------------------------------------------------------
// Core node types
// ---------------------------------------------------------------------------

/// A node in the Onyx knowledge graph. Every code artifact, document, test,
/// and config file is represented as a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Globally unique identifier.
    pub id: Uuid,
    /// The type of this node (code entity, doc, test, config).
    pub node_type: NodeType,
    /// Human-readable name (e.g., function name, doc title).
    pub name: String,
    /// Full source text or document body.
    pub content: String,
    /// Content digest computed by the server (hex-encoded).
    pub content_hash: String,
    /// Extensible key-value metadata.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    /// Origin information: file path, line range, commit, repo.
    #[serde(default)]
    pub provenance: Provenance,
    /// Vector embedding (None if not yet computed).
    #[serde(default)]
    pub embedding: Option<Vec<f32>>,
    /// Pointer to the latest version in the history store.
    #[serde(default)]
    pub current_version: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
    /// Type-specific extension data.
    #[serde(default)]
    pub extension: Option<NodeExtension>,
}

impl Validate for Node {
    fn validate(&self) -> Result<(), String> {
        match &self.extension {
            Some(ext) if ext.category() != self.node_type.category() => Err(format!(
                "node {} has node_type {} but a {} extension",
                self.id,
                self.node_type.category(),
                ext.category()
            )),
            _ => Ok(()),
        }
    }
}

/// Categorises what kind of artifact a node represents.
///
/// On the wire: `{"type":"CodeEntity","kind":"Function"}` or `{"type":"Doc"}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "kind")]
pub enum NodeType {
    /// A code entity with a specific kind.
    CodeEntity(CodeEntityKind),
    /// Documentation.
    Doc,
    /// A test.
    Test,
    /// Configuration file.
    Config,
}

impl NodeType {
    /// Shorthand for creating a code-entity node type.
    pub fn code_entity(kind: CodeEntityKind) -> Self {
        NodeType::CodeEntity(kind)
    }

    /// The discriminator string used on the wire.
    pub fn category(&self) -> &'static str {
        match self {
            NodeType::CodeEntity(_) => "CodeEntity",
            NodeType::Doc => "Doc",
            NodeType::Test => "Test",
            NodeType::Config => "Config",
        }
    }
}

/// The kind of code entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CodeEntityKind {
    Function,
    Struct,
    Enum,
    Trait,
    Impl,
    Module,
    Constant,
    TypeAlias,
    Macro,
}

impl FromStr for CodeEntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "function" | "fn" => Ok(CodeEntityKind::Function),
            "struct" => Ok(CodeEntityKind::Struct),
            "enum" => Ok(CodeEntityKind::Enum),
            "trait" => Ok(CodeEntityKind::Trait),
            "impl" => Ok(CodeEntityKind::Impl),
            "module" | "mod" => Ok(CodeEntityKind::Module),
            "constant" | "const" => Ok(CodeEntityKind::Constant),
            "typealias" | "type" => Ok(CodeEntityKind::TypeAlias),
            "macro" => Ok(CodeEntityKind::Macro),
            other => Err(format!("unknown code entity kind '{other}'")),
        }
    }
}

// ---------------------------------------------------------------------------
// Type-specific extension data
// ---------------------------------------------------------------------------

/// Type-specific extension data carried by a node. The variant must agree
/// with the node's [`NodeType`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NodeExtension {
    CodeEntity(CodeEntityExt),
    Doc(DocExt),
    Test(TestExt),
    Config(ConfigExt),
}

impl NodeExtension {
    /// The discriminator string used on the wire.
    pub fn category(&self) -> &'static str {
        match self {
            NodeExtension::CodeEntity(_) => "CodeEntity",
            NodeExtension::Doc(_) => "Doc",
            NodeExtension::Test(_) => "Test",
            NodeExtension::Config(_) => "Config",
        }
    }

    /// Whether this extension is the right shape for `node_type`.
    pub fn matches(&self, node_type: &NodeType) -> bool {
        self.category() == node_type.category()
    }
}

/// Extension data for code entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeEntityExt {
    pub language: Language,
    #[serde(default)]
    pub signature: Option<String>,
    #[serde(default = "Visibility::private")]
    pub visibility: Visibility,
    #[serde(default)]
    pub module_path: Vec<String>,
    #[serde(default)]
    pub line_range: Option<(usize, usize)>,
}

impl Default for CodeEntityExt {
    fn default() -> Self {
        Self {
            language: Language::Rust,
            signature: None,
            visibility: Visibility::Private,
            module_path: Vec::new(),
            line_range: None,
        }
    }
}

/// Programming language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    Rust,
    Python,
    TypeScript,
    JavaScript,
    Go,
    Other(String),
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "rust" | "rs" => Language::Rust,
            "python" | "py" => Language::Python,
            "typescript" | "ts" => Language::TypeScript,
            "javascript" | "js" => Language::JavaScript,
            "go" => Language::Go,
            "" => return Err("language must not be empty".to_string()),
            _ => Language::Other(s.to_string()),
        })
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::Rust => f.write_str("Rust"),
            Language::Python => f.write_str("Python"),
            Language::TypeScript => f.write_str("TypeScript"),
            Language::JavaScript => f.write_str("JavaScript"),
            Language::Go => f.write_str("Go"),
            Language::Other(name) => f.write_str(name),
        }
    }
}

/// Visibility level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visibility {
    Public,
    PubCrate,
    Private,
}

impl Visibility {
    fn private() -> Self {
        Visibility::Private
    }
}

/// Extension data for documentation nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocExt {
    pub doc_type: DocType,
    pub format: DocFormat,
    #[serde(default)]
    pub target_id: Option<Uuid>,
}

impl Default for DocExt {
    fn default() -> Self {
        Self {
            doc_type: DocType::Readme,
            format: DocFormat::Markdown,
            target_id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocType {
    Inline,
    Readme,
    ApiDoc,
    Tutorial,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocFormat {
    Markdown,
    RustDoc,
    PlainText,
}

/// Extension data for test nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestExt {
    pub test_kind: TestKind,
    #[serde(default)]
    pub target_ids: Vec<Uuid>,
    #[serde(default)]
    pub last_result: Option<TestResult>,
}

impl Default for TestExt {
    fn default() -> Self {
        Self {
            test_kind: TestKind::Unit,
            target_ids: Vec::new(),
            last_result: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TestKind {
    Unit,
    Integration,
    Property,
    Benchmark,
}

/// Result of a test execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub passed: bool,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Extension data for configuration nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigExt {
    pub config_type: ConfigType,
    pub format: ConfigFormat,
}

impl Default for ConfigExt {
    fn default() -> Self {
        Self {
            config_type: ConfigType::Cargo,
            format: ConfigFormat::Toml,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigType {
    Cargo,
    CI,
    Docker,
    Env,
    Build,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigFormat {
    Toml,
    Yaml,
    Json,
    Ini,
}

// ---------------------------------------------------------------------------
// Provenance: tracks where a node came from
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_range: Option<(usize, usize)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

impl Provenance {
    pub fn new(file_path: impl Into<String>) -> Self {
        Self {
            file_path: Some(file_path.into()),
            ..Default::default()
        }
    }

    pub fn with_lines(mut self, start: usize, end: usize) -> Self {
        self.line_range = Some((start, end));
        self
    }

    pub fn with_commit(mut self, commit: impl Into<String>) -> Self {
        self.commit_id = Some(commit.into());
        self
    }

    pub fn with_repo(mut self, repo_url: impl Into<String>) -> Self {
        self.repo_url = Some(repo_url.into());
        self
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for creating a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateNodeRequest {
    pub name: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<NodeType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provenance: Option<Provenance>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl CreateNodeRequest {
    /// Create a new request with the required fields.
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            node_type: None,
            metadata: None,
            provenance: None,
            embedding: None,
        }
    }

    /// Set the node type.
    pub fn node_type(mut self, nt: NodeType) -> Self {
        self.node_type = Some(nt);
        self
    }

    /// Set metadata.
    pub fn metadata(mut self, metadata: HashMap<String, String>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Set provenance.
    pub fn provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = Some(provenance);
        self
    }

    /// Set the embedding vector.
    pub fn embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }
}

/// Request body for updating a node.
///
/// Every field is optional; anything left unset is omitted from the body and
/// the server keeps its current value. `metadata`, `provenance` and
/// `embedding` can additionally be cleared with the `clear_*` setters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateNodeRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<NodeType>,
    #[serde(default, skip_serializing_if = "Patch::is_unset")]
    pub metadata: Patch<HashMap<String, String>>,
    #[serde(default, skip_serializing_if = "Patch::is_unset")]
    pub provenance: Patch<Provenance>,
    #[serde(default, skip_serializing_if = "Patch::is_unset")]
    pub embedding: Patch<Vec<f32>>,
}

impl UpdateNodeRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn node_type(mut self, nt: NodeType) -> Self {
        self.node_type = Some(nt);
        self
    }

    pub fn metadata(mut self, metadata: HashMap<String, String>) -> Self {
        self.metadata = Patch::Set(metadata);
        self
    }

    pub fn clear_metadata(mut self) -> Self {
        self.metadata = Patch::Clear;
        self
    }

    pub fn provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = Patch::Set(provenance);
        self
    }

    pub fn clear_provenance(mut self) -> Self {
        self.provenance = Patch::Clear;
        self
    }

    pub fn embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Patch::Set(embedding);
        self
    }

    pub fn clear_embedding(mut self) -> Self {
        self.embedding = Patch::Clear;
        self
    }

    /// True when the request would not change anything.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.content.is_none()
            && self.node_type.is_none()
            && self.metadata.is_unset()
            && self.provenance.is_unset()
            && self.embedding.is_unset()
    }
}

/// Paginated list response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListNodesResponse {
    pub nodes: Vec<Node>,
    pub total: usize,
    pub page: usize,
    pub per_page: usize,
}

impl Validate for ListNodesResponse {
    fn validate(&self) -> Result<(), String> {
        self.nodes.validate()
    }
}
