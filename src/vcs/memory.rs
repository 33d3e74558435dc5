//! Deterministic in-memory gateway for tests.
//!
//! Holds scripted branches and per-branch file trees, supports scripted
//! per-branch failures for fault-isolation scenarios, and counts content
//! reads so tests can assert the cache-hit invariant (zero reads for
//! unchanged files).

use std::collections::{BTreeMap, HashMap, HashSet};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};

use crate::models::BranchDescriptor;
use crate::vcs::VcsGateway;
use crate::{AppError, Result};

#[derive(Debug)]
struct MemoryFile {
    bytes: Vec<u8>,
    modified_at: DateTime<Utc>,
}

#[derive(Debug)]
struct State {
    is_repository: bool,
    current_branch: String,
    branches: Vec<BranchDescriptor>,
    files: HashMap<String, BTreeMap<String, MemoryFile>>,
    failing_branches: HashSet<String>,
}

impl Default for State {
    fn default() -> Self {
        Self {
            is_repository: true,
            current_branch: "main".to_owned(),
            branches: Vec::new(),
            files: HashMap::new(),
            failing_branches: HashSet::new(),
        }
    }
}

/// In-memory [`VcsGateway`] fake.
///
/// Every operation resolves immediately from scripted state; ordering is
/// deterministic (file maps are `BTreeMap`-backed).
#[derive(Debug, Default)]
pub struct MemoryGateway {
    state: Mutex<State>,
    reads: AtomicUsize,
}

impl MemoryGateway {
    /// Create an empty repository with `main` checked out.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a gateway that reports no repository at all.
    #[must_use]
    pub fn non_repository() -> Self {
        let gateway = Self::default();
        gateway.lock().is_repository = false;
        gateway
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Script a branch with the given tip commit time.
    pub fn add_branch(&self, name: &str, is_remote: bool, last_commit: DateTime<Utc>) {
        self.lock().branches.push(BranchDescriptor {
            name: name.to_owned(),
            is_remote,
            last_commit,
        });
    }

    /// Set the checked-out branch name.
    pub fn set_current_branch(&self, name: &str) {
        self.lock().current_branch = name.to_owned();
    }

    /// Script a file on a branch.
    pub fn add_file(&self, branch: &str, path: &str, bytes: &[u8], modified_at: DateTime<Utc>) {
        self.lock().files.entry(branch.to_owned()).or_default().insert(
            path.to_owned(),
            MemoryFile {
                bytes: bytes.to_vec(),
                modified_at,
            },
        );
    }

    /// Remove a scripted file from a branch.
    pub fn remove_file(&self, branch: &str, path: &str) {
        if let Some(files) = self.lock().files.get_mut(branch) {
            files.remove(path);
        }
    }

    /// Script every query touching `branch` to time out.
    pub fn fail_branch(&self, branch: &str) {
        self.lock().failing_branches.insert(branch.to_owned());
    }

    /// Number of content reads served so far.
    #[must_use]
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn check_branch(state: &State, branch: &str) -> Result<()> {
        if state.failing_branches.contains(branch) {
            return Err(AppError::Timeout(format!(
                "scripted timeout for branch {branch}"
            )));
        }
        Ok(())
    }
}

impl VcsGateway for MemoryGateway {
    fn is_repository(&self) -> Pin<Box<dyn Future<Output = bool> + Send + '_>> {
        let result = self.lock().is_repository;
        Box::pin(async move { result })
    }

    fn list_branches(
        &self,
        include_remote: bool,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<BranchDescriptor>>> + Send + '_>> {
        let result = {
            let state = self.lock();
            state
                .branches
                .iter()
                .filter(|branch| include_remote || !branch.is_remote)
                .cloned()
                .collect::<Vec<_>>()
        };
        Box::pin(async move { Ok(result) })
    }

    fn current_branch(&self) -> Pin<Box<dyn Future<Output = Result<String>> + Send + '_>> {
        let result = self.lock().current_branch.clone();
        Box::pin(async move { Ok(result) })
    }

    fn file_modified_map(
        &self,
        branch: &str,
        prefix: &str,
    ) -> Pin<Box<dyn Future<Output = Result<HashMap<String, DateTime<Utc>>>> + Send + '_>> {
        let result = {
            let state = self.lock();
            Self::check_branch(&state, branch).map(|()| {
                let prefix = format!("{}/", prefix.trim_end_matches('/'));
                state.files.get(branch).map_or_else(HashMap::new, |files| {
                    files
                        .iter()
                        .filter(|(path, _)| path.starts_with(&prefix))
                        .map(|(path, file)| {
                            let name = path.rsplit('/').next().unwrap_or(path.as_str());
                            (name.to_owned(), file.modified_at)
                        })
                        .collect()
                })
            })
        };
        Box::pin(async move { result })
    }

    fn read_file(
        &self,
        branch: &str,
        path: &str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<u8>>> + Send + '_>> {
        let result = {
            let state = self.lock();
            Self::check_branch(&state, branch).and_then(|()| {
                state
                    .files
                    .get(branch)
                    .and_then(|files| files.get(path))
                    .map(|file| file.bytes.clone())
                    .ok_or_else(|| AppError::NotFound(format!("{branch}:{path}")))
            })
        };
        if result.is_ok() {
            self.reads.fetch_add(1, Ordering::SeqCst);
        }
        Box::pin(async move { result })
    }

    fn list_files(
        &self,
        branch: &str,
        path: &str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<String>>> + Send + '_>> {
        let result = {
            let state = self.lock();
            Self::check_branch(&state, branch).map(|()| {
                let prefix = format!("{}/", path.trim_end_matches('/'));
                state.files.get(branch).map_or_else(Vec::new, |files| {
                    files
                        .keys()
                        .filter(|candidate| candidate.starts_with(&prefix))
                        .cloned()
                        .collect()
                })
            })
        };
        Box::pin(async move { result })
    }

    fn path_exists(
        &self,
        branch: &str,
        path: &str,
    ) -> Pin<Box<dyn Future<Output = Result<bool>> + Send + '_>> {
        let result = {
            let state = self.lock();
            Self::check_branch(&state, branch).map(|()| {
                state
                    .files
                    .get(branch)
                    .is_some_and(|files| files.contains_key(path))
            })
        };
        Box::pin(async move { result })
    }
}
