//! Git metadata queries against a working copy.
//!
//! Every public query is total: a missing `git` binary, a timeout, a
//! non-zero exit or unparseable output yields an empty or absent result
//! and a `debug` log line, never an error.

use std::path::{Path, PathBuf};
use std::time::Duration;

use covgate_core::{CovgateError, GitConfig};
use tracing::debug;

use crate::parse;
use crate::runner::run_captured;
use crate::types::{BaseBranch, BlameInfo, Commit, FileDiff};

/// Default per-call timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Handle to a git working copy.
///
/// # Examples
///
/// ```no_run
/// use covgate_vcs::GitRepo;
///
/// let repo = GitRepo::new(".");
/// for diff in repo.diff_against_base() {
///     println!("{} {}", diff.status.code(), diff.path);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct GitRepo {
    repo_path: PathBuf,
    timeout: Duration,
}

impl GitRepo {
    /// Create a handle for the working copy containing `repo_path`.
    pub fn new(repo_path: impl Into<PathBuf>) -> Self {
        Self {
            repo_path: repo_path.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Create a handle using the timeout from `[git]` configuration.
    pub fn from_config(repo_path: impl Into<PathBuf>, config: &GitConfig) -> Self {
        Self::new(repo_path).with_timeout(config.timeout())
    }

    /// Override the per-call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the repository path.
    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }

    /// Whether the path is inside a git working tree.
    pub fn is_repository(&self) -> bool {
        self.git(&["rev-parse", "--is-inside-work-tree"])
            .map(|out| out.trim() == "true")
            .unwrap_or(false)
    }

    /// File-level diff of the working tree against `base`.
    ///
    /// Joins `--name-status` with `--numstat`; counts for renames attach to
    /// the new path.
    pub fn diff(&self, base: &str) -> Vec<FileDiff> {
        if !is_safe_ref(base) {
            debug!(base, "refusing ref that looks like an option");
            return Vec::new();
        }

        let status_out = match self.git(&["diff", "--name-status", base, "--"]) {
            Ok(out) => out,
            Err(e) => {
                debug!(error = %e, base, "name-status listing failed");
                return Vec::new();
            }
        };
        let mut diffs = parse::parse_name_status(&status_out);

        match self.git(&["diff", "--numstat", base, "--"]) {
            Ok(out) => parse::apply_numstat(&mut diffs, &parse::parse_numstat(&out)),
            Err(e) => debug!(error = %e, base, "numstat listing failed; counts left at 0"),
        }

        diffs
    }

    /// [`diff`](Self::diff) against [`base_branch`](Self::base_branch).
    pub fn diff_against_base(&self) -> Vec<FileDiff> {
        self.diff(self.base_branch().as_str())
    }

    /// Paths with unstaged (or, with `staged`, staged) changes.
    pub fn changed_files(&self, staged: bool) -> Vec<String> {
        let args: &[&str] = if staged {
            &["diff", "--name-only", "--cached"]
        } else {
            &["diff", "--name-only"]
        };
        self.git(args)
            .map(|out| parse::parse_name_only(&out))
            .unwrap_or_else(|e| {
                debug!(error = %e, staged, "changed-file listing failed");
                Vec::new()
            })
    }

    /// Attribution for one 1-indexed line of `file`.
    ///
    /// `None` for line 0, lines past the end, untracked files, or any git failure.
    pub fn blame(&self, file: &str, line: u32) -> Option<BlameInfo> {
        if line == 0 {
            return None;
        }
        let range = format!("{line},{line}");
        match self.git(&["blame", "-L", &range, "--porcelain", "--", file]) {
            Ok(out) => parse::parse_blame_porcelain(&out, line),
            Err(e) => {
                debug!(error = %e, file, line, "blame failed");
                None
            }
        }
    }

    /// The `count` most recent commits, optionally limited to `path`.
    ///
    /// Each commit's `files_changed` comes from a follow-up `diff-tree`
    /// call; if that call fails the list is left empty for that commit.
    pub fn recent_commits(&self, count: usize, path: Option<&str>) -> Vec<Commit> {
        if count == 0 {
            return Vec::new();
        }
        let limit = count.to_string();
        let format = format!("--format={}", parse::LOG_FORMAT);
        let mut args = vec!["log", "-n", limit.as_str(), format.as_str()];
        if let Some(path) = path {
            args.extend(["--", path]);
        }

        let mut commits = match self.git(&args) {
            Ok(out) => parse::parse_log(&out),
            Err(e) => {
                debug!(error = %e, "log failed");
                return Vec::new();
            }
        };

        for commit in &mut commits {
            commit.files_changed = self.files_in_commit(&commit.hash);
        }
        commits
    }

    /// Commit history of a single file.
    pub fn file_history(&self, file: &str, count: usize) -> Vec<Commit> {
        self.recent_commits(count, Some(file))
    }

    /// Name of the checked-out branch; `None` when detached or on failure.
    pub fn current_branch(&self) -> Option<String> {
        let out = self.git(&["branch", "--show-current"]).ok()?;
        let name = out.trim();
        (!name.is_empty()).then(|| name.to_string())
    }

    /// `main` if it exists, otherwise `master`.
    pub fn base_branch(&self) -> BaseBranch {
        match self.git(&["branch", "--list", "main", "master"]) {
            Ok(out) => parse::parse_branch_list(&out),
            Err(e) => {
                debug!(error = %e, "branch listing failed; assuming master");
                BaseBranch::Master
            }
        }
    }

    /// `(merge-base(base, HEAD), "HEAD")`, or `(base, "HEAD")` when the
    /// merge base cannot be determined. `base` defaults to
    /// [`base_branch`](Self::base_branch).
    pub fn commit_range(&self, base: Option<&str>) -> (String, String) {
        let base = base
            .map(str::to_string)
            .unwrap_or_else(|| self.base_branch().to_string());
        if !is_safe_ref(&base) {
            return (base, "HEAD".into());
        }
        let merge_base = self
            .git(&["merge-base", &base, "HEAD"])
            .ok()
            .map(|out| out.trim().to_string())
            .filter(|sha| !sha.is_empty());
        (merge_base.unwrap_or(base), "HEAD".into())
    }

    fn files_in_commit(&self, hash: &str) -> Vec<String> {
        match self.git(&["diff-tree", "--no-commit-id", "--name-only", "-r", "--root", hash]) {
            Ok(out) => parse::parse_name_only(&out),
            Err(e) => {
                debug!(error = %e, hash, "diff-tree failed; files_changed left empty");
                Vec::new()
            }
        }
    }

    fn git(&self, args: &[&str]) -> Result<String, CovgateError> {
        // Keep non-ASCII paths verbatim so they match coverage report keys.
        let mut full = Vec::with_capacity(args.len() + 2);
        full.extend(["-c", "core.quotepath=off"]);
        full.extend_from_slice(args);
        run_captured("git", &full, &self.repo_path, self.timeout)
    }
}

fn is_safe_ref(reference: &str) -> bool {
    !reference.is_empty() && !reference.starts_with('-')
}
