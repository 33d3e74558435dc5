#![forbid(unsafe_code)]

//! Cross-branch task index and hydration engine.
//!
//! Tasks live as individual text files in a version-controlled directory
//! tree; the same logical task may exist, in different states, on several
//! branches. This crate discovers which branches are recently active,
//! cheaply indexes candidate task files per branch without reading
//! content, hydrates only the content that is actually newer than or
//! unknown to the local working tree, merges per-branch copies of one task
//! id under a configurable policy, and memoizes codec output keyed by
//! modification time.
//!
//! The text-format codec and the presentation layer are collaborators, not
//! parts of this crate; see [`codec::Codec`] and [`board::Board`].

pub mod board;
pub mod branches;
pub mod cache;
pub mod codec;
pub mod config;
pub mod errors;
pub mod hydrate;
pub mod index;
pub mod loader;
pub mod merge;
pub mod models;
pub mod ordinal;
pub mod vcs;

pub use board::{Board, RefreshOptions, RefreshOutcome};
pub use config::BoardConfig;
pub use errors::{AppError, Result};
