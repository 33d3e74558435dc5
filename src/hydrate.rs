//! Hydration: fetching full content for indexed entries that are actually
//! newer than or unknown to the local task set.
//!
//! Content reads are cheap but numerous, so hydration runs with a larger
//! concurrency budget than indexing. The parse cache is consulted first
//! with the branch-qualified key; a hit costs zero content reads.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use futures_util::stream::{self, StreamExt};
use tracing::{debug, warn};

use crate::cache::ParseCache;
use crate::codec::Codec;
use crate::models::{normalize_id, TaskRecord, TaskSource};
use crate::vcs::VcsGateway;
use crate::Result;

/// Files hydrated concurrently.
pub const HYDRATION_CONCURRENCY: usize = 8;

/// Outcome of the per-entry fetch decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HydrationDecision {
    /// Local state already covers this entry.
    Skip,
    /// The entry is unknown locally or strictly newer; fetch it.
    Fetch,
}

/// One indexed entry selected for hydration.
#[derive(Debug, Clone)]
pub struct HydrationRequest {
    /// Normalized task id derived from the file name.
    pub id: String,
    /// Branch the entry lives on.
    pub branch: String,
    /// Whether the branch is remote-tracking.
    pub is_remote: bool,
    /// Repository-relative path of the file.
    pub path: String,
    /// Indexed modification time.
    pub modified_at: DateTime<Utc>,
}

/// One hydrated cross-branch task copy, ready for merging.
#[derive(Debug, Clone)]
pub struct HydrationResult {
    /// Normalized task id.
    pub id: String,
    /// Branch the copy came from.
    pub branch: String,
    /// The full decoded record, provenance stamped.
    pub task: TaskRecord,
    /// Timestamp used for merge comparisons.
    pub modified_at: DateTime<Utc>,
}

/// Decide whether an indexed entry needs a content fetch.
///
/// Fetch only when the id is unknown locally or the indexed time is
/// strictly newer than the best known local copy.
#[must_use]
pub fn decide(
    id: &str,
    indexed_at: DateTime<Utc>,
    known_local: &HashMap<String, DateTime<Utc>>,
) -> HydrationDecision {
    match known_local.get(&normalize_id(id)) {
        Some(local_at) if indexed_at <= *local_at => HydrationDecision::Skip,
        _ => HydrationDecision::Fetch,
    }
}

/// Hydrate the selected entries with bounded concurrency.
///
/// A codec or gateway failure on one file drops that file from the batch
/// with a warning; it never aborts the others.
pub async fn hydrate(
    gateway: &dyn VcsGateway,
    codec: &dyn Codec,
    cache: &ParseCache,
    requests: Vec<HydrationRequest>,
) -> (Vec<HydrationResult>, Vec<String>) {
    let mut results = Vec::new();
    let mut warnings = Vec::new();

    let mut stream = stream::iter(requests.into_iter().map(|request| async move {
        let outcome = hydrate_one(gateway, codec, cache, &request).await;
        (request, outcome)
    }))
    .buffer_unordered(HYDRATION_CONCURRENCY);

    while let Some((request, outcome)) = stream.next().await {
        match outcome {
            Ok(result) => results.push(result),
            Err(err) => {
                warn!(
                    branch = request.branch,
                    path = request.path,
                    %err,
                    "dropping file from hydration batch"
                );
                warnings.push(format!("{}:{}: {err}", request.branch, request.path));
            }
        }
    }

    debug!(hydrated = results.len(), "hydration complete");
    (results, warnings)
}

async fn hydrate_one(
    gateway: &dyn VcsGateway,
    codec: &dyn Codec,
    cache: &ParseCache,
    request: &HydrationRequest,
) -> Result<HydrationResult> {
    let key = format!("{}:{}", request.branch, request.path);

    let task = if let Some(cached) = cache.get(&key, request.modified_at) {
        cached
    } else {
        let bytes = gateway.read_file(&request.branch, &request.path).await?;
        let mut task = codec.decode(&bytes, &request.path)?;
        task.id = normalize_id(&task.id);
        task.source = if request.is_remote {
            TaskSource::Remote
        } else {
            TaskSource::LocalBranch
        };
        task.branch = Some(request.branch.clone());
        task.path = request.path.clone();
        task.modified_at = request.modified_at;
        cache.put(&key, request.modified_at, task.clone());
        task
    };

    Ok(HydrationResult {
        id: task.id.clone(),
        branch: request.branch.clone(),
        modified_at: request.modified_at,
        task,
    })
}
