//! Modification-time-keyed memoization of codec output.
//!
//! One [`ParseCache`] is shared by local-branch loading and hydration.
//! Entries are valid only while the stored modification time equals the
//! current on-disk (or indexed) time; any writer that mutates a task file
//! must call [`ParseCache::invalidate`] before the next read; this is a
//! hard contract, not a hint.
//!
//! The cache is the only mutable shared state in the engine. It is an
//! explicitly constructed, injectable object so tests can run isolated
//! instances per scenario.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::models::TaskRecord;

#[derive(Debug, Clone)]
struct Entry {
    modified_at: DateTime<Utc>,
    task: TaskRecord,
}

/// Thread-safe parse cache keyed by path.
///
/// Local files use their working-tree path as the key; hydrated branch
/// files use `"<branch>:<path>"` so the two namespaces cannot collide.
/// Operations on a single key are linearizable: an invalidation is visible
/// to the very next `get` for that key. No lock is held across an await
/// point.
#[derive(Debug, Default)]
pub struct ParseCache {
    entries: Mutex<HashMap<String, Entry>>,
}

impl ParseCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Look up the record cached for `key`.
    ///
    /// Misses when nothing is stored, when the stored modification time
    /// differs from `modified_at`, or when the stored record does not
    /// belong under `key` (an internal inconsistency, which is dropped and
    /// reported as a miss rather than surfaced).
    #[must_use]
    pub fn get(&self, key: &str, modified_at: DateTime<Utc>) -> Option<TaskRecord> {
        let mut entries = self.lock();
        let entry = entries.get(key)?;
        if !entry.task.path.is_empty() && !key.ends_with(entry.task.path.as_str()) {
            warn!(key, path = entry.task.path, "cache entry under wrong key, dropping");
            entries.remove(key);
            return None;
        }
        if entry.modified_at != modified_at {
            return None;
        }
        Some(entry.task.clone())
    }

    /// Store a record for `key` at the given modification time.
    ///
    /// Concurrent writers racing on one key resolve in favor of the newest
    /// timestamp; an older write never clobbers a newer entry.
    pub fn put(&self, key: &str, modified_at: DateTime<Utc>, task: TaskRecord) {
        let mut entries = self.lock();
        if let Some(existing) = entries.get(key) {
            if existing.modified_at > modified_at {
                return;
            }
        }
        entries.insert(key.to_owned(), Entry { modified_at, task });
    }

    /// Drop the entry for `key`, if any.
    pub fn invalidate(&self, key: &str) {
        self.lock().remove(key);
    }

    /// Drop every entry. For bulk or structural writes.
    pub fn invalidate_all(&self) {
        self.lock().clear();
    }

    /// Evict entries under `dir` whose file name no longer appears in a
    /// fresh directory listing.
    pub fn evict_missing(&self, dir: &str, listed: &[String]) {
        self.lock().retain(|key, _| {
            if !key.starts_with(dir) {
                return true;
            }
            let name = key.rsplit(['/', '\\']).next().unwrap_or(key.as_str());
            listed.iter().any(|l| l == name)
        });
    }

    /// Number of live entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
