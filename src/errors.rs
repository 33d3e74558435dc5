//! Error types shared across the engine.

use std::fmt::{Display, Formatter};

/// Shared application result type.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error enumeration covering all domain failure modes.
#[derive(Debug)]
pub enum AppError {
    /// Configuration parsing or validation failure.
    Config(String),
    /// The working directory is not a usable version-controlled repository.
    Repository(String),
    /// A version-control subprocess call failed.
    Gateway(String),
    /// A single gateway call exceeded its time budget.
    Timeout(String),
    /// The codec rejected a task file.
    Decode(String),
    /// Parse-cache invariant violation reported by a writer collaborator.
    Cache(String),
    /// File-system or I/O operation failure.
    Io(String),
    /// Requested branch path or entity does not exist.
    NotFound(String),
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Repository(msg) => write!(f, "repository: {msg}"),
            Self::Gateway(msg) => write!(f, "gateway: {msg}"),
            Self::Timeout(msg) => write!(f, "timeout: {msg}"),
            Self::Decode(msg) => write!(f, "decode: {msg}"),
            Self::Cache(msg) => write!(f, "cache: {msg}"),
            Self::Io(msg) => write!(f, "io: {msg}"),
            Self::NotFound(msg) => write!(f, "not found: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(format!("invalid config: {err}"))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
