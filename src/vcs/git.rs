//! Subprocess-backed gateway implementation.
//!
//! Each operation is one `git -C <root> …` invocation with its own time
//! budget. Porcelain parsing is kept in pure functions so it is testable
//! without spawning anything.

use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::process::Stdio;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use tokio::process::Command;
use tracing::debug;

use crate::models::BranchDescriptor;
use crate::vcs::VcsGateway;
use crate::{AppError, Result};

/// Default per-call time budget.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);

/// Marker prefixing each commit-time line in the batched modification log.
const TIME_MARKER: char = '\u{1}';

/// Gateway backed by the `git` binary.
#[derive(Debug, Clone)]
pub struct GitGateway {
    root: PathBuf,
    timeout: Duration,
}

impl GitGateway {
    /// Create a gateway rooted at `root` with the default call timeout.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    /// Create a gateway with an explicit per-call timeout.
    #[must_use]
    pub fn with_timeout(root: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            root: root.into(),
            timeout,
        }
    }

    /// Run one git invocation and capture its output.
    ///
    /// The child is killed when the timeout budget elapses or the future is
    /// dropped; a timeout on one call carries no state into the next.
    async fn output(&self, args: &[&str]) -> Result<std::process::Output> {
        let mut cmd = Command::new("git");
        cmd.arg("-C")
            .arg(&self.root)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!(args = ?args, "git call");
        let result = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| AppError::Timeout(format!("git {} exceeded call budget", args[0])))?;
        result.map_err(|err| AppError::Gateway(format!("failed to run git {}: {err}", args[0])))
    }

    /// Run one git invocation, requiring a zero exit status.
    async fn run(&self, args: &[&str]) -> Result<Vec<u8>> {
        let output = self.output(args).await?;
        if output.status.success() {
            Ok(output.stdout)
        } else {
            Err(AppError::Gateway(format!(
                "git {} failed: {}",
                args[0],
                String::from_utf8_lossy(&output.stderr).trim()
            )))
        }
    }

    async fn run_text(&self, args: &[&str]) -> Result<String> {
        let bytes = self.run(args).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl VcsGateway for GitGateway {
    fn is_repository(&self) -> Pin<Box<dyn Future<Output = bool> + Send + '_>> {
        Box::pin(async move {
            match self.run_text(&["rev-parse", "--is-inside-work-tree"]).await {
                Ok(out) => out.trim() == "true",
                Err(_) => false,
            }
        })
    }

    fn list_branches(
        &self,
        include_remote: bool,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<BranchDescriptor>>> + Send + '_>> {
        Box::pin(async move {
            let format = "--format=%(refname)%00%(committerdate:unix)";
            let mut args = vec!["for-each-ref", format, "refs/heads"];
            if include_remote {
                args.push("refs/remotes");
            }
            let out = self.run_text(&args).await?;
            Ok(parse_branch_list(&out))
        })
    }

    fn current_branch(&self) -> Pin<Box<dyn Future<Output = Result<String>> + Send + '_>> {
        Box::pin(async move {
            let out = self.run_text(&["rev-parse", "--abbrev-ref", "HEAD"]).await?;
            Ok(out.trim().to_owned())
        })
    }

    fn file_modified_map(
        &self,
        branch: &str,
        prefix: &str,
    ) -> Pin<Box<dyn Future<Output = Result<HashMap<String, DateTime<Utc>>>> + Send + '_>> {
        let branch = branch.to_owned();
        let prefix = prefix.to_owned();
        Box::pin(async move {
            let out = self
                .run_text(&[
                    "log",
                    "--pretty=format:%x01%ct",
                    "--name-only",
                    &branch,
                    "--",
                    &prefix,
                ])
                .await?;
            Ok(parse_modified_map(&out))
        })
    }

    fn read_file(
        &self,
        branch: &str,
        path: &str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<u8>>> + Send + '_>> {
        let revspec = format!("{branch}:{path}");
        Box::pin(async move {
            let output = self.output(&["show", &revspec]).await?;
            if output.status.success() {
                return Ok(output.stdout);
            }
            let stderr = String::from_utf8_lossy(&output.stderr);
            if is_missing_path(&stderr) {
                Err(AppError::NotFound(revspec.clone()))
            } else {
                Err(AppError::Gateway(format!(
                    "git show {revspec} failed: {}",
                    stderr.trim()
                )))
            }
        })
    }

    fn list_files(
        &self,
        branch: &str,
        path: &str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<String>>> + Send + '_>> {
        let branch = branch.to_owned();
        let path = path.to_owned();
        Box::pin(async move {
            let out = self
                .run_text(&["ls-tree", "-r", "--name-only", &branch, "--", &path])
                .await?;
            Ok(out
                .lines()
                .filter(|line| !line.is_empty())
                .map(str::to_owned)
                .collect())
        })
    }

    fn path_exists(
        &self,
        branch: &str,
        path: &str,
    ) -> Pin<Box<dyn Future<Output = Result<bool>> + Send + '_>> {
        let revspec = format!("{branch}:{path}");
        Box::pin(async move {
            let output = self.output(&["cat-file", "-e", &revspec]).await?;
            Ok(output.status.success())
        })
    }
}

fn is_missing_path(stderr: &str) -> bool {
    stderr.contains("does not exist")
        || stderr.contains("exists on disk, but not in")
        || stderr.contains("invalid object name")
}

/// Parse `for-each-ref` output into branch descriptors.
///
/// Input lines look like `refs/heads/feature\0<unix-time>`. Remote HEAD
/// aliases (`refs/remotes/origin/HEAD`) and lines with unparsable times are
/// skipped.
#[must_use]
pub fn parse_branch_list(output: &str) -> Vec<BranchDescriptor> {
    output
        .lines()
        .filter_map(|line| {
            let (refname, time) = line.split_once('\0')?;
            let seconds: i64 = time.trim().parse().ok()?;
            let last_commit = Utc.timestamp_opt(seconds, 0).single()?;
            if let Some(name) = refname.strip_prefix("refs/heads/") {
                return Some(BranchDescriptor {
                    name: name.to_owned(),
                    is_remote: false,
                    last_commit,
                });
            }
            let name = refname.strip_prefix("refs/remotes/")?;
            if name.ends_with("/HEAD") {
                return None;
            }
            Some(BranchDescriptor {
                name: name.to_owned(),
                is_remote: true,
                last_commit,
            })
        })
        .collect()
}

/// Parse one batched `git log --name-only` walk into a bare-file-name →
/// last-modified map.
///
/// The log is newest-first, so the first commit time seen for a file wins.
#[must_use]
pub fn parse_modified_map(output: &str) -> HashMap<String, DateTime<Utc>> {
    let mut map = HashMap::new();
    let mut current: Option<DateTime<Utc>> = None;
    for line in output.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }
        if let Some(time) = line.strip_prefix(TIME_MARKER) {
            current = time
                .trim()
                .parse::<i64>()
                .ok()
                .and_then(|s| Utc.timestamp_opt(s, 0).single());
            continue;
        }
        let Some(time) = current else { continue };
        let name = line.rsplit('/').next().unwrap_or(line);
        map.entry(name.to_owned()).or_insert(time);
    }
    map
}
