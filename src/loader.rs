//! Local-branch task loading from the working tree.
//!
//! The working tree is the always-authoritative task set: everything under
//! the active, draft, and completed directories loads through the shared
//! parse cache, keyed by absolute path and modification time. Archived
//! tasks are hidden from the board and are not loaded here.

use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::cache::ParseCache;
use crate::codec::Codec;
use crate::models::{normalize_id, TaskRecord, TaskSource};

/// Directory of tasks being worked on.
pub const ACTIVE_DIR: &str = "active";
/// Directory of unpublished draft tasks.
pub const DRAFT_DIR: &str = "draft";
/// Directory of finished tasks.
pub const COMPLETED_DIR: &str = "completed";
/// Directory of archived tasks, excluded from refresh.
pub const ARCHIVED_DIR: &str = "archived";

/// Load the local task set from `<root>/<tasks_dir>`.
///
/// Per-file failures (unreadable file, codec rejection) become warnings and
/// the file is skipped; a missing directory simply contributes nothing.
/// Exactly one record per id is returned; a duplicate id across
/// directories keeps the newer copy with a warning.
pub async fn load_local_tasks(
    root: &Path,
    tasks_dir: &str,
    codec: &dyn Codec,
    cache: &ParseCache,
) -> (Vec<TaskRecord>, Vec<String>) {
    let mut tasks: HashMap<String, TaskRecord> = HashMap::new();
    let mut warnings = Vec::new();

    let sources = [
        (ACTIVE_DIR, TaskSource::Local),
        (DRAFT_DIR, TaskSource::Local),
        (COMPLETED_DIR, TaskSource::Completed),
    ];

    for (dir, source) in sources {
        let abs_dir = root.join(tasks_dir).join(dir);
        let Ok(mut entries) = tokio::fs::read_dir(&abs_dir).await else {
            continue;
        };

        let mut listed = Vec::new();
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(err) => {
                    warnings.push(format!("{}: {err}", abs_dir.display()));
                    break;
                }
            };

            let name = entry.file_name().to_string_lossy().into_owned();
            if codec.task_id(&name).is_none() {
                continue;
            }
            let rel_path = format!("{tasks_dir}/{dir}/{name}");

            let metadata = match entry.metadata().await {
                Ok(metadata) if metadata.is_file() => metadata,
                Ok(_) => continue,
                Err(err) => {
                    warnings.push(format!("{rel_path}: {err}"));
                    continue;
                }
            };
            let modified_at = match metadata.modified() {
                Ok(system_time) => DateTime::<Utc>::from(system_time),
                Err(err) => {
                    warnings.push(format!("{rel_path}: {err}"));
                    continue;
                }
            };

            let key = entry.path().to_string_lossy().into_owned();
            let task = if let Some(cached) = cache.get(&key, modified_at) {
                cached
            } else {
                let bytes = match tokio::fs::read(entry.path()).await {
                    Ok(bytes) => bytes,
                    Err(err) => {
                        warnings.push(format!("{rel_path}: {err}"));
                        continue;
                    }
                };
                let mut task = match codec.decode(&bytes, &rel_path) {
                    Ok(task) => task,
                    Err(err) => {
                        warn!(path = rel_path, %err, "skipping undecodable task file");
                        warnings.push(format!("{rel_path}: {err}"));
                        continue;
                    }
                };
                task.id = normalize_id(&task.id);
                task.source = source;
                task.branch = None;
                task.path = rel_path.clone();
                task.modified_at = modified_at;
                cache.put(&key, modified_at, task.clone());
                task
            };

            listed.push(name);
            if let Some(existing) = tasks.get(&task.id) {
                warnings.push(format!(
                    "duplicate task id {} at {rel_path}; keeping the newer copy",
                    task.id
                ));
                if existing.modified_at >= task.modified_at {
                    continue;
                }
            }
            tasks.insert(task.id.clone(), task);
        }

        cache.evict_missing(&abs_dir.to_string_lossy(), &listed);
    }

    debug!(count = tasks.len(), "local tasks loaded");
    (tasks.into_values().collect(), warnings)
}
