//! Cheap per-branch indexing of candidate task files.
//!
//! The index phase asks the gateway for batched modification maps only and
//! never reads file content. That distinction from hydration is what
//! keeps a refresh cheap when many branches are active.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use futures_util::stream::{self, StreamExt};
use tracing::debug;

use crate::models::BranchDescriptor;
use crate::vcs::VcsGateway;
use crate::Result;

/// Branches indexed concurrently. Indexing is one batched call per
/// branch/prefix pair, so a small budget is enough.
pub const INDEX_CONCURRENCY: usize = 5;

/// Per-branch map of repository-relative path → last-modified time.
pub type BranchIndex = HashMap<String, HashMap<String, DateTime<Utc>>>;

/// Build the cross-branch index for `branches` over `prefixes`.
///
/// Runs with bounded concurrency across branches. A failing branch is
/// excluded and reported as a warning; it never aborts indexing of the
/// others.
pub async fn build_index(
    gateway: &dyn VcsGateway,
    branches: &[BranchDescriptor],
    prefixes: &[String],
) -> (BranchIndex, Vec<String>) {
    let mut index = BranchIndex::new();
    let mut warnings = Vec::new();

    let mut results = stream::iter(branches.iter().map(|branch| async move {
        let files = index_branch(gateway, &branch.name, prefixes).await;
        (branch.name.clone(), files)
    }))
    .buffer_unordered(INDEX_CONCURRENCY);

    while let Some((branch, result)) = results.next().await {
        match result {
            Ok(files) => {
                debug!(branch, files = files.len(), "indexed branch");
                index.insert(branch, files);
            }
            Err(err) => warnings.push(format!("branch {branch}: {err}")),
        }
    }

    (index, warnings)
}

async fn index_branch(
    gateway: &dyn VcsGateway,
    branch: &str,
    prefixes: &[String],
) -> Result<HashMap<String, DateTime<Utc>>> {
    let mut files = HashMap::new();
    for prefix in prefixes {
        let map = gateway.file_modified_map(branch, prefix).await?;
        let prefix = prefix.trim_end_matches('/');
        for (name, time) in map {
            files.insert(format!("{prefix}/{name}"), time);
        }
    }
    Ok(files)
}
