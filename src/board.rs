//! The caller boundary: one entry point that runs the refresh pipeline.
//!
//! A refresh always loads the authoritative local set first, then, when
//! cross-branch checking is enabled and a repository is present, walks
//! enumeration, indexing, and hydration, yielding between phases so an
//! interactive caller stays responsive. Cross-branch failure of any kind
//! degrades to warnings; it never blocks the local view.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::branches;
use crate::cache::ParseCache;
use crate::codec::Codec;
use crate::config::BoardConfig;
use crate::hydrate::{self, HydrationDecision, HydrationRequest, HydrationResult};
use crate::index;
use crate::loader;
use crate::merge::{merge, ResolutionStrategy};
use crate::models::{normalize_id, BranchDescriptor, TaskRecord};
use crate::vcs::VcsGateway;
use crate::Result;

/// Per-call overrides for a refresh.
#[derive(Debug, Clone, Copy, Default)]
pub struct RefreshOptions {
    /// Override the configured recency window.
    pub window_days: Option<i64>,
    /// Override the configured conflict strategy.
    pub strategy: Option<ResolutionStrategy>,
}

/// Result of one refresh: the unified task list plus per-item warnings.
#[derive(Debug, Clone)]
pub struct RefreshOutcome {
    /// Merged, deterministically ordered task records.
    pub tasks: Vec<TaskRecord>,
    /// Human-readable reports of items excluded by recoverable failures.
    pub warnings: Vec<String>,
}

/// The cross-branch task index and hydration engine.
pub struct Board {
    root: PathBuf,
    config: BoardConfig,
    gateway: Arc<dyn VcsGateway>,
    codec: Arc<dyn Codec>,
    cache: Arc<ParseCache>,
}

impl Board {
    /// Create a board over the workspace at `root`.
    #[must_use]
    pub fn new(
        root: impl Into<PathBuf>,
        config: BoardConfig,
        gateway: Arc<dyn VcsGateway>,
        codec: Arc<dyn Codec>,
        cache: Arc<ParseCache>,
    ) -> Self {
        Self {
            root: root.into(),
            config,
            gateway,
            codec,
            cache,
        }
    }

    /// Handle to the shared parse cache.
    ///
    /// Writer collaborators must invalidate through this handle before the
    /// next read of any file they mutate.
    #[must_use]
    pub fn cache(&self) -> &Arc<ParseCache> {
        &self.cache
    }

    /// Invalidate the cache entry for one working-tree path.
    pub fn invalidate_path(&self, key: &str) {
        self.cache.invalidate(key);
    }

    /// Invalidate every cache entry. For bulk or structural writes.
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    /// Name of the repository's primary branch.
    ///
    /// # Errors
    ///
    /// Propagates gateway failures; see [`branches::main_branch`].
    pub async fn main_branch(&self) -> Result<String> {
        branches::main_branch(&*self.gateway).await
    }

    /// Run one refresh and return the unified task list.
    ///
    /// When cross-branch checking is disabled the pipeline collapses to the
    /// fast local-only path. With it enabled, branch enumeration, indexing,
    /// and hydration run with bounded concurrency, and every per-branch or
    /// per-file failure degrades to a warning.
    ///
    /// # Errors
    ///
    /// Only local-set failures can error; cross-branch problems, including
    /// total repository unavailability, degrade to warnings on a result
    /// that still carries the local tasks.
    pub async fn refresh(&self, options: RefreshOptions) -> Result<RefreshOutcome> {
        let strategy = options.strategy.unwrap_or(self.config.resolution_strategy);
        let window_days = options.window_days.unwrap_or(self.config.active_branch_days);

        let (local, mut warnings) = loader::load_local_tasks(
            &self.root,
            &self.config.tasks_dir,
            &*self.codec,
            &self.cache,
        )
        .await;

        if !self.config.check_active_branches {
            debug!("cross-branch checking disabled; local-only refresh");
            return Ok(self.finish(local, Vec::new(), strategy, warnings));
        }

        if !self.gateway.is_repository().await {
            warnings.push(
                "not a version-controlled directory; cross-branch tasks unavailable".to_owned(),
            );
            return Ok(self.finish(local, Vec::new(), strategy, warnings));
        }

        tokio::task::yield_now().await;

        let current = match self.gateway.current_branch().await {
            Ok(name) => name,
            Err(err) => {
                warnings.push(format!("cannot determine current branch: {err}"));
                return Ok(self.finish(local, Vec::new(), strategy, warnings));
            }
        };
        let cross = match branches::recent_branches(
            &*self.gateway,
            window_days,
            self.config.remote_operations,
            &current,
        )
        .await
        {
            Ok(list) => list
                .into_iter()
                .filter(|branch| branch.name != current)
                .collect::<Vec<BranchDescriptor>>(),
            Err(err) => {
                warnings.push(format!("cannot list branches: {err}"));
                return Ok(self.finish(local, Vec::new(), strategy, warnings));
            }
        };
        info!(branches = cross.len(), window_days, "cross-branch refresh");
        if cross.is_empty() {
            return Ok(self.finish(local, Vec::new(), strategy, warnings));
        }

        tokio::task::yield_now().await;

        let prefixes = vec![
            format!("{}/{}", self.config.tasks_dir, loader::ACTIVE_DIR),
            format!("{}/{}", self.config.tasks_dir, loader::COMPLETED_DIR),
        ];
        let (branch_index, index_warnings) =
            index::build_index(&*self.gateway, &cross, &prefixes).await;
        warnings.extend(index_warnings);

        let requests = self.select_candidates(&local, &cross, &branch_index);
        debug!(candidates = requests.len(), "hydration candidates selected");

        tokio::task::yield_now().await;

        let (hydrated, hydrate_warnings) =
            hydrate::hydrate(&*self.gateway, &*self.codec, &self.cache, requests).await;
        warnings.extend(hydrate_warnings);

        Ok(self.finish(local, hydrated, strategy, warnings))
    }

    /// Turn the index into hydration requests: only entries whose id is
    /// unknown locally or whose indexed time beats the local copy.
    fn select_candidates(
        &self,
        local: &[TaskRecord],
        cross: &[BranchDescriptor],
        branch_index: &index::BranchIndex,
    ) -> Vec<HydrationRequest> {
        let known: HashMap<String, DateTime<Utc>> = local
            .iter()
            .map(|task| (task.id.clone(), task.modified_at))
            .collect();
        let remote_flags: HashMap<&str, bool> = cross
            .iter()
            .map(|branch| (branch.name.as_str(), branch.is_remote))
            .collect();

        let mut requests = Vec::new();
        for (branch, files) in branch_index {
            let is_remote = remote_flags.get(branch.as_str()).copied().unwrap_or(false);
            for (path, modified_at) in files {
                let name = path.rsplit('/').next().unwrap_or(path.as_str());
                let Some(raw_id) = self.codec.task_id(name) else {
                    continue;
                };
                let id = normalize_id(&raw_id);
                if hydrate::decide(&id, *modified_at, &known) == HydrationDecision::Fetch {
                    requests.push(HydrationRequest {
                        id,
                        branch: branch.clone(),
                        is_remote,
                        path: path.clone(),
                        modified_at: *modified_at,
                    });
                }
            }
        }
        requests
    }

    fn finish(
        &self,
        local: Vec<TaskRecord>,
        hydrated: Vec<HydrationResult>,
        strategy: ResolutionStrategy,
        warnings: Vec<String>,
    ) -> RefreshOutcome {
        let tasks = merge(local, hydrated, strategy, &self.config.statuses);
        RefreshOutcome { tasks, warnings }
    }
}
