//! Board configuration parsing, normalization, and validation.
//!
//! External configuration arrives loosely typed and variably cased
//! (`check_active_branches = true`, `checkActiveBranches = "yes"`, …).
//! Everything is normalized here into one canonical [`BoardConfig`]; no
//! other component ever branches on a raw key spelling or a stringly
//! scalar.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::merge::ResolutionStrategy;
use crate::{AppError, Result};

/// A boolean that external config may spell as a bool, an integer, or a
/// string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LooseBool {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl LooseBool {
    fn resolve(self, key: &str) -> Result<bool> {
        match self {
            Self::Bool(value) => Ok(value),
            Self::Int(1) => Ok(true),
            Self::Int(0) => Ok(false),
            Self::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Ok(true),
                "false" | "no" | "off" | "0" => Ok(false),
                other => Err(AppError::Config(format!(
                    "{key}: cannot read `{other}` as a boolean"
                ))),
            },
            Self::Int(other) => Err(AppError::Config(format!(
                "{key}: cannot read `{other}` as a boolean"
            ))),
        }
    }
}

/// An integer that external config may spell as a number or a string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LooseInt {
    Int(i64),
    Text(String),
}

impl LooseInt {
    fn resolve(self, key: &str) -> Result<i64> {
        match self {
            Self::Int(value) => Ok(value),
            Self::Text(text) => text.trim().parse().map_err(|_| {
                AppError::Config(format!("{key}: cannot read `{text}` as an integer"))
            }),
        }
    }
}

/// Raw configuration as written by the user, before normalization.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
struct RawBoardConfig {
    #[serde(alias = "checkActiveBranches")]
    check_active_branches: Option<LooseBool>,
    #[serde(alias = "activeBranchDays")]
    active_branch_days: Option<LooseInt>,
    #[serde(alias = "remoteOperations")]
    remote_operations: Option<LooseBool>,
    #[serde(alias = "taskResolutionStrategy")]
    task_resolution_strategy: Option<String>,
    statuses: Option<Vec<String>>,
    #[serde(alias = "tasksDir")]
    tasks_dir: Option<String>,
    #[serde(alias = "gatewayTimeoutSeconds")]
    gateway_timeout_seconds: Option<LooseInt>,
}

fn default_statuses() -> Vec<String> {
    vec![
        "To Do".to_owned(),
        "In Progress".to_owned(),
        "Done".to_owned(),
    ]
}

fn default_active_branch_days() -> i64 {
    30
}

fn default_tasks_dir() -> String {
    "tasks".to_owned()
}

fn default_gateway_timeout_seconds() -> u64 {
    10
}

/// Canonical, fully-typed board configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardConfig {
    /// Whether refresh looks beyond the current branch at all. When false
    /// the pipeline collapses to the fast local-only path.
    pub check_active_branches: bool,
    /// Recency window, in days, for cross-branch work.
    pub active_branch_days: i64,
    /// Whether remote-tracking branches participate.
    pub remote_operations: bool,
    /// Conflict policy for ids present on several branches.
    pub resolution_strategy: ResolutionStrategy,
    /// Workflow statuses in progression order; the injectable ordering used
    /// by the `most_progressed` strategy.
    pub statuses: Vec<String>,
    /// Directory under the workspace root holding the task tree.
    pub tasks_dir: String,
    /// Per-call time budget for gateway operations, in seconds.
    pub gateway_timeout_seconds: u64,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            check_active_branches: true,
            active_branch_days: default_active_branch_days(),
            remote_operations: false,
            resolution_strategy: ResolutionStrategy::MostRecent,
            statuses: default_statuses(),
            tasks_dir: default_tasks_dir(),
            gateway_timeout_seconds: default_gateway_timeout_seconds(),
        }
    }
}

impl BoardConfig {
    /// Load and normalize configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Config`] if the file cannot be read, contains
    /// invalid TOML, or fails validation.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse and normalize configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Config`] if parsing, normalization, or
    /// validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let raw: RawBoardConfig = toml::from_str(raw)?;
        let config = Self {
            check_active_branches: raw
                .check_active_branches
                .map_or(Ok(true), |v| v.resolve("check_active_branches"))?,
            active_branch_days: raw
                .active_branch_days
                .map_or(Ok(default_active_branch_days()), |v| {
                    v.resolve("active_branch_days")
                })?,
            remote_operations: raw
                .remote_operations
                .map_or(Ok(false), |v| v.resolve("remote_operations"))?,
            resolution_strategy: raw
                .task_resolution_strategy
                .map_or(Ok(ResolutionStrategy::MostRecent), |v| {
                    parse_strategy(&v)
                })?,
            statuses: raw.statuses.unwrap_or_else(default_statuses),
            tasks_dir: raw.tasks_dir.unwrap_or_else(default_tasks_dir),
            gateway_timeout_seconds: match raw.gateway_timeout_seconds {
                Some(value) => u64::try_from(value.resolve("gateway_timeout_seconds")?)
                    .map_err(|_| {
                        AppError::Config(
                            "gateway_timeout_seconds must not be negative".to_owned(),
                        )
                    })?,
                None => default_gateway_timeout_seconds(),
            },
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.active_branch_days < 1 {
            return Err(AppError::Config(
                "active_branch_days must be at least 1".to_owned(),
            ));
        }
        if self.gateway_timeout_seconds == 0 {
            return Err(AppError::Config(
                "gateway_timeout_seconds must be at least 1".to_owned(),
            ));
        }
        if self.statuses.is_empty() {
            return Err(AppError::Config("statuses must not be empty".to_owned()));
        }
        if self.tasks_dir.is_empty()
            || self.tasks_dir.starts_with('/')
            || self.tasks_dir.split('/').any(|part| part == "..")
        {
            return Err(AppError::Config(
                "tasks_dir must be a relative path inside the workspace".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Normalize a strategy spelling (`most_recent`, `mostRecent`,
/// `most-recent`, …) into the canonical enum.
fn parse_strategy(raw: &str) -> Result<ResolutionStrategy> {
    let folded: String = raw
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect();
    match folded.as_str() {
        "mostrecent" => Ok(ResolutionStrategy::MostRecent),
        "mostprogressed" => Ok(ResolutionStrategy::MostProgressed),
        _ => Err(AppError::Config(format!(
            "task_resolution_strategy: unknown strategy `{raw}`"
        ))),
    }
}
