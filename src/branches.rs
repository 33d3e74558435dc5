//! Branch enumeration: recency filtering and primary-branch selection.

use chrono::{Duration, Utc};

use crate::models::BranchDescriptor;
use crate::vcs::VcsGateway;
use crate::{AppError, Result};

/// List branches whose tip commit falls inside the recency window.
///
/// `current` is the checked-out branch; it is always kept regardless of
/// age. Filtering is monotonic: widening the window never removes a branch
/// that passed a narrower window. A remote-tracking branch shadowed by a
/// local branch of the same short name is dropped; the local pointer is
/// authoritative for that line of work.
///
/// # Errors
///
/// Propagates gateway failures from the underlying branch listing.
pub async fn recent_branches(
    gateway: &dyn VcsGateway,
    window_days: i64,
    include_remote: bool,
    current: &str,
) -> Result<Vec<BranchDescriptor>> {
    let all = gateway.list_branches(include_remote).await?;
    let cutoff = Utc::now() - Duration::days(window_days);

    let local_names: Vec<&str> = all
        .iter()
        .filter(|branch| !branch.is_remote)
        .map(|branch| branch.name.as_str())
        .collect();

    let mut recent: Vec<BranchDescriptor> = all
        .iter()
        .filter(|branch| {
            if branch.is_remote && local_names.contains(&branch.short_name()) {
                return false;
            }
            branch.name == current || branch.last_commit >= cutoff
        })
        .cloned()
        .collect();

    recent.sort_by(|a, b| (a.is_remote, &a.name).cmp(&(b.is_remote, &b.name)));
    Ok(recent)
}

/// Name of the primary branch.
///
/// Prefers the conventional names `main` then `master`; otherwise falls
/// back to the alphabetically first local branch.
///
/// # Errors
///
/// Returns [`AppError::Repository`] when the repository has no branches,
/// and propagates gateway failures from the branch listing.
pub async fn main_branch(gateway: &dyn VcsGateway) -> Result<String> {
    let mut names: Vec<String> = gateway
        .list_branches(false)
        .await?
        .into_iter()
        .map(|branch| branch.name)
        .collect();

    for conventional in ["main", "master"] {
        if names.iter().any(|name| name == conventional) {
            return Ok(conventional.to_owned());
        }
    }

    names.sort();
    names
        .into_iter()
        .next()
        .ok_or_else(|| AppError::Repository("repository has no branches".to_owned()))
}
