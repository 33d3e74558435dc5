//! Shared fixtures for board-level integration tests.
//!
//! Provides a tempdir-backed working tree, a scripted in-memory gateway,
//! and a minimal line-oriented codec so individual test modules can focus
//! on behaviour rather than boilerplate.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use branchboard::cache::ParseCache;
use branchboard::codec::Codec;
use branchboard::models::TaskRecord;
use branchboard::vcs::MemoryGateway;
use branchboard::{AppError, Board, BoardConfig, Result};
use chrono::{DateTime, Duration, Utc};

/// Minimal `key: value` line codec for test task files.
///
/// Recognized keys: `id`, `status`, `priority`, `ordinal`; anything else
/// lands in the record's extra map. Counts decodes so tests can assert the
/// cache-hit invariant.
#[derive(Debug, Default)]
pub struct LineCodec {
    decodes: AtomicUsize,
}

impl LineCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decode_count(&self) -> usize {
        self.decodes.load(Ordering::SeqCst)
    }
}

impl Codec for LineCodec {
    fn decode(&self, bytes: &[u8], path: &str) -> Result<TaskRecord> {
        self.decodes.fetch_add(1, Ordering::SeqCst);
        let text = std::str::from_utf8(bytes)
            .map_err(|_| AppError::Decode(format!("{path}: not utf-8")))?;

        let mut id = None;
        let mut status = None;
        let mut priority = None;
        let mut ordinal = None;
        let mut extra = serde_json::Map::new();
        for line in text.lines() {
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim();
            match key.trim() {
                "id" => id = Some(value.to_owned()),
                "status" => status = Some(value.to_owned()),
                "priority" => priority = Some(value.to_owned()),
                "ordinal" => {
                    ordinal = Some(value.parse().map_err(|_| {
                        AppError::Decode(format!("{path}: bad ordinal `{value}`"))
                    })?);
                }
                other => {
                    extra.insert(
                        other.to_owned(),
                        serde_json::Value::String(value.to_owned()),
                    );
                }
            }
        }

        let id = id.ok_or_else(|| AppError::Decode(format!("{path}: missing id")))?;
        let mut task = TaskRecord::new(id, status.unwrap_or_else(|| "To Do".to_owned()));
        task.priority = priority;
        task.ordinal = ordinal;
        task.extra = extra;
        Ok(task)
    }

    fn encode(&self, task: &TaskRecord) -> Result<Vec<u8>> {
        let mut out = format!("id: {}\nstatus: {}\n", task.id, task.status);
        if let Some(priority) = &task.priority {
            out.push_str(&format!("priority: {priority}\n"));
        }
        if let Some(ordinal) = task.ordinal {
            out.push_str(&format!("ordinal: {ordinal}\n"));
        }
        for (key, value) in &task.extra {
            if let Some(text) = value.as_str() {
                out.push_str(&format!("{key}: {text}\n"));
            }
        }
        Ok(out.into_bytes())
    }

    fn task_id(&self, file_name: &str) -> Option<String> {
        let stem = file_name.strip_suffix(".md")?;
        if stem.starts_with("task-") {
            Some(stem.to_owned())
        } else {
            None
        }
    }
}

/// Install a test-writer subscriber so `RUST_LOG=debug` surfaces engine
/// traces during a failing run. Safe to call from every fixture.
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Body of a minimal task file.
pub fn task_body(id: &str, status: &str) -> String {
    format!("id: {id}\nstatus: {status}\ntitle: {id} work\n")
}

/// Write a task file under `<root>/tasks/<dir>/<file>` and return its path.
pub fn write_local_task(root: &Path, dir: &str, file: &str, body: &str) -> PathBuf {
    let dir_path = root.join("tasks").join(dir);
    std::fs::create_dir_all(&dir_path).expect("create task dir");
    let path = dir_path.join(file);
    std::fs::write(&path, body).expect("write task file");
    path
}

/// A timestamp the given number of days in the past.
pub fn days_ago(days: i64) -> DateTime<Utc> {
    Utc::now() - Duration::days(days)
}

/// A timestamp one hour in the future — "newer than anything on disk".
pub fn ahead() -> DateTime<Utc> {
    Utc::now() + Duration::hours(1)
}

/// Board fixture: tempdir working tree + scripted gateway + shared cache.
pub struct Fixture {
    pub root: tempfile::TempDir,
    pub gateway: Arc<MemoryGateway>,
    pub codec: Arc<LineCodec>,
    pub cache: Arc<ParseCache>,
}

impl Fixture {
    /// Repository fixture with `main` checked out.
    pub fn new() -> Self {
        let gateway = Arc::new(MemoryGateway::new());
        gateway.add_branch("main", false, Utc::now());
        gateway.set_current_branch("main");
        Self::with_gateway(gateway)
    }

    /// Fixture whose gateway reports no repository at all.
    pub fn non_repository() -> Self {
        Self::with_gateway(Arc::new(MemoryGateway::non_repository()))
    }

    fn with_gateway(gateway: Arc<MemoryGateway>) -> Self {
        init_tracing();
        Self {
            root: tempfile::tempdir().expect("tempdir"),
            gateway,
            codec: Arc::new(LineCodec::new()),
            cache: Arc::new(ParseCache::new()),
        }
    }

    /// Board over this fixture with default configuration.
    pub fn board(&self) -> Board {
        self.board_with_config(BoardConfig::default())
    }

    /// Board over this fixture with explicit configuration.
    pub fn board_with_config(&self, config: BoardConfig) -> Board {
        Board::new(
            self.root.path(),
            config,
            Arc::clone(&self.gateway) as Arc<dyn branchboard::vcs::VcsGateway>,
            Arc::clone(&self.codec) as Arc<dyn Codec>,
            Arc::clone(&self.cache),
        )
    }
}
