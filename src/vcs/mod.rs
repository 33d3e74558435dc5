//! Version control gateway: the read-only pseudo-RPC boundary to the
//! repository.
//!
//! The [`VcsGateway`] trait decouples the engine (branch enumeration,
//! indexing, hydration) from the subprocess-backed implementation, so unit
//! tests run against a deterministic in-memory fake instead of a real
//! checkout. No gateway operation mutates repository state.

pub mod git;
pub mod memory;

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use chrono::{DateTime, Utc};

use crate::models::BranchDescriptor;
use crate::Result;

pub use git::GitGateway;
pub use memory::MemoryGateway;

/// Read-only, non-blocking queries against the repository.
///
/// All operations are safe to issue concurrently. Each call carries its own
/// failure: one timed-out or failed call never poisons another.
pub trait VcsGateway: Send + Sync {
    /// Whether the working directory is a usable repository.
    ///
    /// Never fails: a malformed or absent repository degrades to `false`.
    fn is_repository(&self) -> Pin<Box<dyn Future<Output = bool> + Send + '_>>;

    /// List branches, optionally including remote-tracking branches.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Gateway`](crate::AppError::Gateway) or
    /// [`AppError::Timeout`](crate::AppError::Timeout) when the underlying
    /// call fails.
    fn list_branches(
        &self,
        include_remote: bool,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<BranchDescriptor>>> + Send + '_>>;

    /// Name of the currently checked-out branch.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Gateway`](crate::AppError::Gateway) or
    /// [`AppError::Timeout`](crate::AppError::Timeout) when the underlying
    /// call fails.
    fn current_branch(&self) -> Pin<Box<dyn Future<Output = Result<String>> + Send + '_>>;

    /// Last-modified time of every file under `prefix` on `branch`, as one
    /// batched query whose cost is independent of file count.
    ///
    /// Keys are bare file names, not full paths.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Gateway`](crate::AppError::Gateway) or
    /// [`AppError::Timeout`](crate::AppError::Timeout) when the underlying
    /// call fails.
    fn file_modified_map(
        &self,
        branch: &str,
        prefix: &str,
    ) -> Pin<Box<dyn Future<Output = Result<HashMap<String, DateTime<Utc>>>> + Send + '_>>;

    /// Content of `path` on `branch`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`](crate::AppError::NotFound) when the
    /// path does not exist on the branch,
    /// [`AppError::Gateway`](crate::AppError::Gateway) or
    /// [`AppError::Timeout`](crate::AppError::Timeout) otherwise.
    fn read_file(
        &self,
        branch: &str,
        path: &str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<u8>>> + Send + '_>>;

    /// Paths of all files under `path` on `branch`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Gateway`](crate::AppError::Gateway) or
    /// [`AppError::Timeout`](crate::AppError::Timeout) when the underlying
    /// call fails.
    fn list_files(
        &self,
        branch: &str,
        path: &str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<String>>> + Send + '_>>;

    /// Whether `path` exists on `branch`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Gateway`](crate::AppError::Gateway) or
    /// [`AppError::Timeout`](crate::AppError::Timeout) when the underlying
    /// call fails.
    fn path_exists(
        &self,
        branch: &str,
        path: &str,
    ) -> Pin<Box<dyn Future<Output = Result<bool>> + Send + '_>>;
}
