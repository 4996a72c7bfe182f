//! Value types produced by the git metadata queries.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One file's change relative to a base ref.
///
/// # Examples
///
/// ```
/// use covgate_vcs::types::{DiffStatus, FileDiff};
///
/// let diff = FileDiff {
///     path: "src/new_name.py".into(),
///     status: DiffStatus::Renamed { from: "src/old_name.py".into() },
///     additions: 4,
///     deletions: 1,
/// };
/// assert_eq!(diff.old_path(), Some("src/old_name.py"));
/// assert_eq!(diff.status.code(), 'R');
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDiff {
    /// Path in the working tree (the new path for renames).
    pub path: String,
    /// Kind of change.
    #[serde(flatten)]
    pub status: DiffStatus,
    /// Lines added; 0 for binary files.
    pub additions: u64,
    /// Lines deleted; 0 for binary files.
    pub deletions: u64,
}

impl FileDiff {
    pub(crate) fn new(path: impl Into<String>, status: DiffStatus) -> Self {
        Self {
            path: path.into(),
            status,
            additions: 0,
            deletions: 0,
        }
    }

    /// Previous path, present only for renames.
    pub fn old_path(&self) -> Option<&str> {
        match &self.status {
            DiffStatus::Renamed { from } => Some(from),
            _ => None,
        }
    }
}

/// Status of a file in a diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum DiffStatus {
    /// New file (copies are reported as additions at the destination).
    Added,
    /// Existing file modified.
    Modified,
    /// File removed.
    Deleted,
    /// File renamed from another path.
    Renamed {
        /// Original path before rename.
        #[serde(rename = "oldPath")]
        from: String,
    },
}

impl DiffStatus {
    /// Single-letter code as printed by `git diff --name-status`.
    pub fn code(&self) -> char {
        match self {
            DiffStatus::Added => 'A',
            DiffStatus::Modified => 'M',
            DiffStatus::Deleted => 'D',
            DiffStatus::Renamed { .. } => 'R',
        }
    }
}

impl fmt::Display for DiffStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffStatus::Added => write!(f, "added"),
            DiffStatus::Modified => write!(f, "modified"),
            DiffStatus::Deleted => write!(f, "deleted"),
            DiffStatus::Renamed { from } => write!(f, "renamed from {from}"),
        }
    }
}

/// A commit from `git log`.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use covgate_vcs::types::Commit;
///
/// let commit = Commit {
///     hash: "abc123def4567890abc123def4567890abc123de".into(),
///     short_hash: "abc123d".into(),
///     author: "Jane Doe".into(),
///     author_email: "jane@example.com".into(),
///     date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
///     message: "feat: add feature".into(),
///     files_changed: vec!["src/main.py".into()],
/// };
/// assert_eq!(commit.files_changed.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commit {
    /// Full commit hash.
    pub hash: String,
    /// Abbreviated hash as git prints it.
    pub short_hash: String,
    /// Author name.
    pub author: String,
    /// Author email.
    pub author_email: String,
    /// Author date (calendar date in the author's timezone).
    pub date: NaiveDate,
    /// Subject line of the commit message.
    pub message: String,
    /// Paths touched by the commit; empty if that lookup failed.
    pub files_changed: Vec<String>,
}

/// Attribution for a single line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlameInfo {
    /// Commit that last touched the line.
    pub commit_hash: String,
    /// Author name.
    pub author: String,
    /// Author email without angle brackets.
    pub author_email: String,
    /// Author date (calendar date in the author's timezone).
    pub date: NaiveDate,
    /// 1-indexed line number that was queried.
    pub line_number: u32,
    /// Line content without the trailing newline.
    pub content: String,
}

/// Conventional base branch of a repository.
///
/// # Examples
///
/// ```
/// use covgate_vcs::types::BaseBranch;
///
/// assert_eq!(BaseBranch::Main.as_str(), "main");
/// assert_eq!(BaseBranch::default(), BaseBranch::Master);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseBranch {
    /// `main`, preferred when present.
    Main,
    /// `master`, the fallback.
    #[default]
    Master,
}

impl BaseBranch {
    /// Branch name.
    pub fn as_str(self) -> &'static str {
        match self {
            BaseBranch::Main => "main",
            BaseBranch::Master => "master",
        }
    }
}

impl fmt::Display for BaseBranch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
