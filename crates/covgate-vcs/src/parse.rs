//! Parsers for git's plain-text output.
//!
//! Every parser is total: lines it does not understand are skipped, and a
//! result that cannot be built at all is `None`. Nothing here runs git.

use chrono::{DateTime, FixedOffset, NaiveDate};
use tracing::debug;

use crate::types::{BaseBranch, BlameInfo, Commit, DiffStatus, FileDiff};

/// Record terminator placed after each commit by [`LOG_FORMAT`].
pub const LOG_RECORD_END: char = '\u{1e}';

/// `git log --format` string understood by [`parse_log`].
pub const LOG_FORMAT: &str = "%H%n%h%n%an%n%ae%n%ai%n%s%n%x1e";

/// Parse `git diff --name-status` output.
///
/// Rename (`R100\told\tnew`) and copy (`C75\tsrc\tdst`) lines carry two
/// paths; copies are reported as additions at the destination. Type changes
/// and unmerged entries are reported as modifications.
///
/// # Examples
///
/// ```
/// use covgate_vcs::parse::parse_name_status;
///
/// let diffs = parse_name_status("M\tsrc/app.py\nR087\told.py\tnew.py\n");
/// assert_eq!(diffs.len(), 2);
/// assert_eq!(diffs[1].path, "new.py");
/// assert_eq!(diffs[1].old_path(), Some("old.py"));
/// ```
pub fn parse_name_status(output: &str) -> Vec<FileDiff> {
    let mut diffs = Vec::new();

    for line in output.lines() {
        let parts: Vec<&str> = line.split('\t').collect();
        if parts.len() < 2 {
            continue;
        }
        let Some(code) = parts[0].chars().next() else {
            continue;
        };
        let second = parts.get(2).copied().unwrap_or(parts[1]);

        let diff = match code {
            'A' => FileDiff::new(parts[1], DiffStatus::Added),
            'M' | 'T' | 'U' => FileDiff::new(parts[1], DiffStatus::Modified),
            'D' => FileDiff::new(parts[1], DiffStatus::Deleted),
            'R' => FileDiff::new(
                second,
                DiffStatus::Renamed {
                    from: parts[1].to_string(),
                },
            ),
            'C' => FileDiff::new(second, DiffStatus::Added),
            other => {
                debug!(status = %other, line, "skipping unknown name-status entry");
                continue;
            }
        };
        diffs.push(diff);
    }

    diffs
}

/// Line counts for one path from `git diff --numstat`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumStat {
    /// Path after the change (rename notation already resolved).
    pub path: String,
    /// Lines added.
    pub additions: u64,
    /// Lines deleted.
    pub deletions: u64,
}

/// Parse `git diff --numstat` output.
///
/// Binary files report `-` for both counts; those become 0. Lines whose
/// counts are neither a number nor `-` are skipped.
///
/// # Examples
///
/// ```
/// use covgate_vcs::parse::parse_numstat;
///
/// let stats = parse_numstat("3\t1\tsrc/app.py\n-\t-\tlogo.png\n");
/// assert_eq!(stats[0].additions, 3);
/// assert_eq!(stats[1].additions, 0);
/// ```
pub fn parse_numstat(output: &str) -> Vec<NumStat> {
    output
        .lines()
        .filter_map(|line| {
            let mut parts = line.splitn(3, '\t');
            let additions = parse_count(parts.next()?)?;
            let deletions = parse_count(parts.next()?)?;
            let path = parts.next()?;
            if path.is_empty() {
                return None;
            }
            Some(NumStat {
                path: numstat_new_path(path),
                additions,
                deletions,
            })
        })
        .collect()
}

fn parse_count(field: &str) -> Option<u64> {
    if field == "-" {
        return Some(0);
    }
    field.parse().ok()
}

/// Resolve numstat rename notation to the destination path.
///
/// Handles both `old => new` and `dir/{old => new}/file`.
///
/// # Examples
///
/// ```
/// use covgate_vcs::parse::numstat_new_path;
///
/// assert_eq!(numstat_new_path("a.py => b.py"), "b.py");
/// assert_eq!(numstat_new_path("src/{util => lib}/io.py"), "src/lib/io.py");
/// assert_eq!(numstat_new_path("src/{ => nested}/io.py"), "src/nested/io.py");
/// assert_eq!(numstat_new_path("plain.py"), "plain.py");
/// ```
pub fn numstat_new_path(raw: &str) -> String {
    if let (Some(open), Some(close)) = (raw.find('{'), raw.rfind('}')) {
        if open < close {
            let inner = &raw[open + 1..close];
            if let Some((_, new)) = inner.split_once(" => ") {
                let joined = format!("{}{}{}", &raw[..open], new, &raw[close + 1..]);
                return joined.replace("//", "/");
            }
        }
    }
    match raw.split_once(" => ") {
        Some((_, new)) => new.to_string(),
        None => raw.to_string(),
    }
}

/// Attach numstat counts to diffs by path.
///
/// Counts for paths that have no name-status entry are ignored.
pub fn apply_numstat(diffs: &mut [FileDiff], stats: &[NumStat]) {
    for stat in stats {
        match diffs.iter_mut().find(|d| d.path == stat.path) {
            Some(diff) => {
                diff.additions = stat.additions;
                diff.deletions = stat.deletions;
            }
            None => debug!(path = %stat.path, "numstat entry without name-status entry"),
        }
    }
}

/// Parse name-only listings (`git diff --name-only`, `git diff-tree --name-only`).
pub fn parse_name_only(output: &str) -> Vec<String> {
    output
        .lines()
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Pick the base branch from `git branch --list main master` output.
///
/// # Examples
///
/// ```
/// use covgate_vcs::parse::parse_branch_list;
/// use covgate_vcs::types::BaseBranch;
///
/// assert_eq!(parse_branch_list("  master\n* main\n"), BaseBranch::Main);
/// assert_eq!(parse_branch_list("* master\n"), BaseBranch::Master);
/// assert_eq!(parse_branch_list(""), BaseBranch::Master);
/// ```
pub fn parse_branch_list(output: &str) -> BaseBranch {
    let has_main = output.lines().any(|line| {
        let name = line.trim_start_matches(['*', '+', ' ']).trim();
        name == "main"
    });
    if has_main {
        BaseBranch::Main
    } else {
        BaseBranch::Master
    }
}

/// Parse `git blame --porcelain` output for a single line.
///
/// Returns `None` when the header is missing or the author time cannot be
/// read. The date is taken in the author's own timezone (`author-tz`).
pub fn parse_blame_porcelain(output: &str, line_number: u32) -> Option<BlameInfo> {
    let mut lines = output.lines();
    let commit_hash = lines.next()?.split_whitespace().next()?;
    if commit_hash.is_empty() || !commit_hash.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let mut author = String::new();
    let mut author_email = String::new();
    let mut author_time: Option<i64> = None;
    let mut author_tz: Option<FixedOffset> = None;
    let mut content = String::new();

    for line in lines {
        if let Some(rest) = line.strip_prefix("author-mail ") {
            author_email = rest.trim_start_matches('<').trim_end_matches('>').to_string();
        } else if let Some(rest) = line.strip_prefix("author-time ") {
            author_time = rest.trim().parse().ok();
        } else if let Some(rest) = line.strip_prefix("author-tz ") {
            author_tz = parse_tz_offset(rest.trim());
        } else if let Some(rest) = line.strip_prefix("author ") {
            author = rest.to_string();
        } else if let Some(rest) = line.strip_prefix('\t') {
            content = rest.to_string();
        }
    }

    let date = timestamp_to_date(author_time?, author_tz)?;

    Some(BlameInfo {
        commit_hash: commit_hash.to_string(),
        author,
        author_email,
        date,
        line_number,
        content,
    })
}

/// Parse a `+hhmm` / `-hhmm` timezone offset.
fn parse_tz_offset(raw: &str) -> Option<FixedOffset> {
    if raw.len() != 5 || !raw.is_ascii() {
        return None;
    }
    let sign = match &raw[..1] {
        "+" => 1,
        "-" => -1,
        _ => return None,
    };
    let hours: i32 = raw[1..3].parse().ok()?;
    let minutes: i32 = raw[3..5].parse().ok()?;
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

fn timestamp_to_date(secs: i64, offset: Option<FixedOffset>) -> Option<NaiveDate> {
    let utc = DateTime::from_timestamp(secs, 0)?;
    let date = match offset {
        Some(offset) => utc.with_timezone(&offset).date_naive(),
        None => utc.date_naive(),
    };
    Some(date)
}

/// Parse `git log --format=<LOG_FORMAT>` output.
///
/// `files_changed` is left empty; the caller fills it per commit.
/// Records with too few fields or an unreadable date are skipped.
pub fn parse_log(output: &str) -> Vec<Commit> {
    output
        .split(LOG_RECORD_END)
        .filter_map(|record| {
            let record = record.trim_start_matches(['\n', '\r']);
            if record.is_empty() {
                return None;
            }
            let fields: Vec<&str> = record.split('\n').collect();
            if fields.len() < 6 {
                debug!(record, "skipping short log record");
                return None;
            }
            let date = match fields[4]
                .get(..10)
                .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            {
                Some(date) => date,
                None => {
                    debug!(raw = fields[4], "skipping log record with unreadable date");
                    return None;
                }
            };
            Some(Commit {
                hash: fields[0].to_string(),
                short_hash: fields[1].to_string(),
                author: fields[2].to_string(),
                author_email: fields[3].to_string(),
                date,
                message: fields[5].to_string(),
                files_changed: Vec::new(),
            })
        })
        .collect()
}
