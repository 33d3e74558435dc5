//! Task record model and id normalization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Where a merged task record came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TaskSource {
    /// Working tree of the current branch.
    Local,
    /// Another local branch of the same repository.
    LocalBranch,
    /// A remote-tracking branch.
    Remote,
    /// The local completed directory.
    Completed,
}

/// Lightweight view of a cross-branch copy of a task that also exists
/// locally. Alternates are read-only supplementary data; they never replace
/// the local record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct AlternateCopy {
    /// Branch carrying the alternate copy.
    pub branch: String,
    /// Status of the alternate copy.
    pub status: String,
    /// Modification time of the alternate copy.
    pub modified_at: DateTime<Utc>,
}

/// The structured representation of one work item.
///
/// Exactly one record per id survives a merge. Fields this engine does not
/// own round-trip through [`extra`](Self::extra) untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct TaskRecord {
    /// Case-normalized, opaque task identifier.
    pub id: String,
    /// Workflow status (e.g. `To Do`, `In Progress`, `Done`).
    pub status: String,
    /// Optional priority label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    /// Provenance of this record.
    pub source: TaskSource,
    /// Branch the record was hydrated from; `None` for local records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    /// Repository-relative path of the backing file.
    pub path: String,
    /// Last modification time of the backing file.
    pub modified_at: DateTime<Utc>,
    /// Fractional ordering key within a status column.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ordinal: Option<f64>,
    /// Codec-owned fields opaque to this engine.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
    /// Read-only cross-branch copies of this id, populated by the merge.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternates: Vec<AlternateCopy>,
}

impl TaskRecord {
    /// Construct a local record with the given id and status.
    ///
    /// The id is normalized; path, branch, priority, ordinal, and extra
    /// fields start empty and are stamped by the loader or hydrator.
    #[must_use]
    pub fn new(id: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            id: normalize_id(&id.into()),
            status: status.into(),
            priority: None,
            source: TaskSource::Local,
            branch: None,
            path: String::new(),
            modified_at: Utc::now(),
            ordinal: None,
            extra: Map::new(),
            alternates: Vec::new(),
        }
    }

    /// Lightweight alternate view of this record for merge output.
    #[must_use]
    pub fn as_alternate(&self, branch: &str) -> AlternateCopy {
        AlternateCopy {
            branch: branch.to_owned(),
            status: self.status.clone(),
            modified_at: self.modified_at,
        }
    }
}

/// Normalize a raw task id for comparison and display.
///
/// Ids are opaque strings; normalization is trimming plus ASCII
/// uppercasing so `task-12` and `TASK-12` collapse to one key.
#[must_use]
pub fn normalize_id(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}
