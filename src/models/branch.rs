//! Branch descriptor model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One branch of the repository as seen by the enumerator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct BranchDescriptor {
    /// Branch name as reported by the gateway. Remote-tracking branches
    /// keep their remote prefix (`origin/feature`).
    pub name: String,
    /// Whether this is a remote-tracking branch.
    pub is_remote: bool,
    /// Committer time of the branch tip.
    pub last_commit: DateTime<Utc>,
}

impl BranchDescriptor {
    /// Branch name with any remote prefix stripped.
    ///
    /// `origin/feature` and `feature` describe the same line of work; the
    /// enumerator uses the short name to detect such shadows.
    #[must_use]
    pub fn short_name(&self) -> &str {
        if self.is_remote {
            self.name
                .split_once('/')
                .map_or(self.name.as_str(), |(_, rest)| rest)
        } else {
            &self.name
        }
    }
}
