//! Version / history models — temporal versioning and branching.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Branch used when none is given.
pub const DEFAULT_BRANCH: &str = "main";

fn default_branch() -> String {
    DEFAULT_BRANCH.to_string()
}

/// A single version entry in an entity's history.
///
/// Parent links form a DAG per entity: branches fork it and merges join it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionEntry {
    pub version_id: String,
    /// The node this version belongs to.
    pub entity_id: Uuid,
    /// Previous version (None for the initial version).
    #[serde(default)]
    pub parent_version: Option<String>,
    #[serde(default = "default_branch")]
    pub branch: String,
    /// The change relative to the parent version.
    pub diff: Diff,
    #[serde(default)]
    pub commit_id: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl VersionEntry {
    pub fn is_initial(&self) -> bool {
        self.parent_version.is_none()
    }
}

/// A diff between two versions. Exactly one variant per instance, selected
/// by the `"type"` key on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Diff {
    /// Full content snapshot (first version of an entity).
    Initial { content: String },
    /// Textual patch with line counts.
    ContentChanged {
        patch: String,
        additions: usize,
        deletions: usize,
    },
    /// Field name → (old value, new value).
    MetadataChanged {
        changed_fields: HashMap<String, (String, String)>,
    },
    /// Several changes recorded as one version.
    Composite { diffs: Vec<Diff> },
}

impl Diff {
    /// Shorthand for a full-content snapshot.
    pub fn initial(content: impl Into<String>) -> Self {
        Diff::Initial {
            content: content.into(),
        }
    }

    /// Number of lines touched, summed over composite parts.
    pub fn lines_changed(&self) -> usize {
        match self {
            Diff::Initial { content } => content.lines().count(),
            Diff::ContentChanged {
                additions,
                deletions,
                ..
            } => additions + deletions,
            Diff::MetadataChanged { .. } => 0,
            Diff::Composite { diffs } => diffs.iter().map(Diff::lines_changed).sum(),
        }
    }
}

/// Summary of a version for display in query results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionInfo {
    pub version_id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    pub lines_changed: usize,
}

/// A named branch in the history store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    pub name: String,
    /// Latest version on the branch.
    pub head: String,
    /// Version the branch was forked from.
    pub base: String,
    pub created_at: DateTime<Utc>,
    /// Set once the branch has been merged.
    #[serde(default)]
    pub merged_into: Option<String>,
}

impl Branch {
    pub fn is_merged(&self) -> bool {
        self.merged_into.is_some()
    }
}

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request to record a new version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateVersionRequest {
    pub entity_id: Uuid,
    pub diff: Diff,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CreateVersionRequest {
    pub fn new(entity_id: Uuid, diff: Diff) -> Self {
        Self {
            entity_id,
            diff,
            parent_version: None,
            branch: None,
            commit_id: None,
            author: None,
            message: None,
        }
    }

    pub fn parent_version(mut self, parent: impl Into<String>) -> Self {
        self.parent_version = Some(parent.into());
        self
    }

    pub fn branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    pub fn commit_id(mut self, commit: impl Into<String>) -> Self {
        self.commit_id = Some(commit.into());
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Request to create a branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateBranchRequest {
    pub name: String,
    pub base_version: String,
}

impl CreateBranchRequest {
    pub fn new(name: impl Into<String>, base_version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_version: base_version.into(),
        }
    }
}

/// Request to merge `source` into `target`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeBranchRequest {
    pub source: String,
    pub target: String,
}

impl MergeBranchRequest {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// Response for listing versions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListVersionsResponse {
    pub versions: Vec<VersionEntry>,
    pub total: usize,
}

/// Response for listing branches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListBranchesResponse {
    pub branches: Vec<Branch>,
}
