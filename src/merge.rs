//! Merging the authoritative local task set with hydrated cross-branch
//! copies.
//!
//! The local copy of an id is always included and never replaced; branch
//! copies of a locally-known id surface only as read-only alternates.
//! Ids unknown locally keep exactly one surviving branch copy, chosen by
//! the configured strategy. Output ordering is deterministic.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::hydrate::HydrationResult;
use crate::models::TaskRecord;

/// Conflict policy for ids that exist on several branches.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStrategy {
    /// The copy with the latest modification time wins.
    #[default]
    MostRecent,
    /// The copy with the status furthest along the configured status
    /// ordering wins; ties break by most-recent time.
    MostProgressed,
}

/// Merge local tasks with hydrated branch copies under `strategy`.
///
/// `status_order` is the injectable workflow ordering used by
/// [`ResolutionStrategy::MostProgressed`]; statuses compare
/// case-insensitively and unknown statuses rank below every configured
/// one. The unified list is sorted by id and stable across repeated calls
/// with unchanged inputs.
#[must_use]
pub fn merge(
    local: Vec<TaskRecord>,
    hydrated: Vec<HydrationResult>,
    strategy: ResolutionStrategy,
    status_order: &[String],
) -> Vec<TaskRecord> {
    let mut by_id: HashMap<String, Vec<HydrationResult>> = HashMap::new();
    for result in hydrated {
        by_id.entry(result.id.clone()).or_default().push(result);
    }

    let mut merged: Vec<TaskRecord> = Vec::with_capacity(local.len() + by_id.len());

    for mut task in local {
        if let Some(mut copies) = by_id.remove(&task.id) {
            copies.sort_by(|a, b| a.branch.cmp(&b.branch));
            task.alternates = copies
                .iter()
                .map(|copy| copy.task.as_alternate(&copy.branch))
                .collect();
        }
        merged.push(task);
    }

    for (_, copies) in by_id {
        if let Some(winner) = pick_survivor(copies, strategy, status_order) {
            merged.push(winner);
        }
    }

    merged.sort_by(|a, b| a.id.cmp(&b.id));
    merged
}

/// Choose the surviving copy for an id that does not exist locally.
fn pick_survivor(
    copies: Vec<HydrationResult>,
    strategy: ResolutionStrategy,
    status_order: &[String],
) -> Option<TaskRecord> {
    copies
        .into_iter()
        .max_by(|a, b| {
            let primary = match strategy {
                ResolutionStrategy::MostRecent => Ordering::Equal,
                ResolutionStrategy::MostProgressed => status_rank(&a.task.status, status_order)
                    .cmp(&status_rank(&b.task.status, status_order)),
            };
            primary
                .then(a.modified_at.cmp(&b.modified_at))
                // Equal rank and time: highest branch name wins, purely for
                // deterministic output.
                .then_with(|| a.branch.cmp(&b.branch))
        })
        .map(|winner| winner.task)
}

/// Position of `status` in the configured ordering, case-insensitively.
///
/// Unknown statuses rank 0, below the first configured status, so a
/// misspelled status never beats a configured one.
#[must_use]
pub fn status_rank(status: &str, status_order: &[String]) -> usize {
    status_order
        .iter()
        .position(|candidate| candidate.eq_ignore_ascii_case(status))
        .map_or(0, |index| index + 1)
}
