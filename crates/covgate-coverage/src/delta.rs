//! Delta coverage: coverage over lines that are new relative to a baseline.
//!
//! "New" is decided by line number alone. A line counts as new when its
//! number was not instrumented in the baseline entry for the same path, so
//! edits that shift existing code can make old lines look new and new lines
//! look old. No content matching is attempted.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::model::{percentage, CoverageReport};

/// New lines of one changed file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDelta {
    pub path: String,
    /// New lines that are covered in the current report.
    pub covered: Vec<u32>,
    /// New lines that are not covered in the current report.
    pub uncovered: Vec<u32>,
}

impl FileDelta {
    /// Number of new lines in this file.
    pub fn new_lines(&self) -> usize {
        self.covered.len() + self.uncovered.len()
    }
}

/// Totals and per-file detail of a delta computation.
///
/// # Examples
///
/// ```
/// use covgate_coverage::DeltaSummary;
///
/// assert_eq!(DeltaSummary::default().percentage(), 100.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeltaSummary {
    pub new_lines_total: u64,
    pub new_lines_covered: u64,
    /// Changed files with at least one new line, in path order.
    pub files: Vec<FileDelta>,
}

impl DeltaSummary {
    /// Covered share of new lines; 100 when there are no new lines.
    pub fn percentage(&self) -> f64 {
        percentage(self.new_lines_covered, self.new_lines_total)
    }
}

/// Compute new-line coverage of `current` relative to `base`.
///
/// With `changed_files` set to `None`, every path in either report is
/// considered. Paths missing from `current` contribute nothing; paths
/// missing from `base` contribute every line they have in `current`.
pub fn delta_breakdown(
    base: &CoverageReport,
    current: &CoverageReport,
    changed_files: Option<&[String]>,
) -> DeltaSummary {
    let universe: BTreeSet<&str> = match changed_files {
        Some(paths) => paths.iter().map(String::as_str).collect(),
        None => base
            .files()
            .keys()
            .chain(current.files().keys())
            .map(String::as_str)
            .collect(),
    };

    let mut summary = DeltaSummary::default();
    for path in universe {
        let Some(now) = current.get(path) else {
            continue;
        };
        let before = base.get(path).map(|file| file.lines()).unwrap_or_default();

        let mut delta = FileDelta {
            path: path.to_string(),
            ..FileDelta::default()
        };
        for line in now.lines().difference(&before) {
            if now.lines_covered().contains(line) {
                delta.covered.push(*line);
            } else {
                delta.uncovered.push(*line);
            }
        }

        if delta.new_lines() == 0 {
            continue;
        }
        summary.new_lines_total += delta.new_lines() as u64;
        summary.new_lines_covered += delta.covered.len() as u64;
        summary.files.push(delta);
    }
    summary
}

/// Delta coverage percentage of `current` relative to `base`.
///
/// # Examples
///
/// ```
/// use covgate_coverage::{calculate_delta, CoverageReport, FileCoverage};
///
/// let mut base = CoverageReport::default();
/// base.insert(FileCoverage::with_lines("x.py", [1, 2], [3]));
/// let mut current = CoverageReport::default();
/// current.insert(FileCoverage::with_lines("x.py", [1, 2, 4], [3, 5]));
///
/// assert_eq!(calculate_delta(&base, &current, None), 50.0);
/// ```
pub fn calculate_delta(
    base: &CoverageReport,
    current: &CoverageReport,
    changed_files: Option<&[String]>,
) -> f64 {
    delta_breakdown(base, current, changed_files).percentage()
}
