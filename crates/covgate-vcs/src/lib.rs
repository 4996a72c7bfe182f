//! Version-control metadata extraction.
//!
//! Shells out to the `git` command line and parses its porcelain output into
//! typed values: file-level diffs against a base ref, single-line blame,
//! commit history, and base-branch detection. Every query degrades to an
//! empty result instead of failing, so a VCS hiccup never aborts a coverage
//! check.

pub mod parse;
pub mod repo;
mod runner;
pub mod types;

pub use repo::GitRepo;
pub use types::{BaseBranch, BlameInfo, Commit, DiffStatus, FileDiff};
