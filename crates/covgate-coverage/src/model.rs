//! Canonical, schema-independent coverage records.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

/// Coverage facts for a single source file.
///
/// Line sets are private so that a line can never be both covered and
/// uncovered: every insertion goes through [`mark_line`](Self::mark_line),
/// where a covered mark always wins.
///
/// # Examples
///
/// ```
/// use covgate_coverage::FileCoverage;
///
/// let file = FileCoverage::with_lines("src/x.py", [1, 2], [2, 3]);
/// assert!(file.lines_covered().contains(&2));
/// assert!(!file.lines_uncovered().contains(&2));
/// assert_eq!(file.line_coverage(), 2.0 / 3.0 * 100.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileCoverage {
    /// Path as keyed in the report.
    pub path: String,
    /// Number of instrumented statements.
    pub statements_total: u64,
    /// Statements executed at least once.
    pub statements_covered: u64,
    /// Number of branch arms.
    pub branches_total: u64,
    /// Branch arms taken at least once.
    pub branches_covered: u64,
    /// Number of functions (0 when the tool does not report them).
    pub functions_total: u64,
    /// Functions called at least once.
    pub functions_covered: u64,
    lines_covered: BTreeSet<u32>,
    lines_uncovered: BTreeSet<u32>,
}

impl FileCoverage {
    /// Empty record for `path`.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Record with the given line sets and zeroed counters.
    ///
    /// A line present in both iterators ends up covered.
    pub fn with_lines(
        path: impl Into<String>,
        covered: impl IntoIterator<Item = u32>,
        uncovered: impl IntoIterator<Item = u32>,
    ) -> Self {
        let mut file = Self::new(path);
        for line in uncovered {
            file.mark_line(line, false);
        }
        for line in covered {
            file.mark_line(line, true);
        }
        file
    }

    /// Classify `line`. Covered wins over uncovered; line 0 is ignored.
    pub fn mark_line(&mut self, line: u32, covered: bool) {
        if line == 0 {
            return;
        }
        if covered {
            self.lines_uncovered.remove(&line);
            self.lines_covered.insert(line);
        } else if !self.lines_covered.contains(&line) {
            self.lines_uncovered.insert(line);
        }
    }

    /// Lines with at least one executed statement.
    pub fn lines_covered(&self) -> &BTreeSet<u32> {
        &self.lines_covered
    }

    /// Instrumented lines that never executed.
    pub fn lines_uncovered(&self) -> &BTreeSet<u32> {
        &self.lines_uncovered
    }

    /// Every instrumented line, covered or not.
    pub fn lines(&self) -> BTreeSet<u32> {
        self.lines_covered
            .union(&self.lines_uncovered)
            .copied()
            .collect()
    }

    /// Percentage of instrumented lines that are covered; 100 when there are none.
    pub fn line_coverage(&self) -> f64 {
        percentage(
            self.lines_covered.len() as u64,
            (self.lines_covered.len() + self.lines_uncovered.len()) as u64,
        )
    }

    /// Percentage of statements covered; 100 when there are none.
    pub fn statement_coverage(&self) -> f64 {
        percentage(self.statements_covered, self.statements_total)
    }
}

/// Coverage over a set of files with running totals.
///
/// Totals are updated on every [`insert`](Self::insert), so they always
/// equal the sum over the current entries.
///
/// # Examples
///
/// ```
/// use covgate_coverage::{CoverageReport, FileCoverage};
///
/// let mut report = CoverageReport::default();
/// let mut file = FileCoverage::new("src/app.ts");
/// file.statements_total = 4;
/// file.statements_covered = 3;
/// report.insert(file);
/// assert_eq!(report.total_statements(), 4);
/// assert_eq!(report.line_coverage(), 75.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageReport {
    files: BTreeMap<String, FileCoverage>,
    total_statements: u64,
    covered_statements: u64,
    total_branches: u64,
    covered_branches: u64,
    total_functions: u64,
    covered_functions: u64,
}

impl CoverageReport {
    /// Add or replace the entry for `file.path`, keeping totals in step.
    pub fn insert(&mut self, file: FileCoverage) {
        if let Some(old) = self.files.remove(&file.path) {
            self.total_statements -= old.statements_total;
            self.covered_statements -= old.statements_covered;
            self.total_branches -= old.branches_total;
            self.covered_branches -= old.branches_covered;
            self.total_functions -= old.functions_total;
            self.covered_functions -= old.functions_covered;
        }
        self.total_statements += file.statements_total;
        self.covered_statements += file.statements_covered;
        self.total_branches += file.branches_total;
        self.covered_branches += file.branches_covered;
        self.total_functions += file.functions_total;
        self.covered_functions += file.functions_covered;
        self.files.insert(file.path.clone(), file);
    }

    /// Per-file entries keyed by path.
    pub fn files(&self) -> &BTreeMap<String, FileCoverage> {
        &self.files
    }

    /// Entry for an exact path.
    pub fn get(&self, path: &str) -> Option<&FileCoverage> {
        self.files.get(path)
    }

    /// Number of files in the report.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the report has no files.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn total_statements(&self) -> u64 {
        self.total_statements
    }

    pub fn covered_statements(&self) -> u64 {
        self.covered_statements
    }

    pub fn total_branches(&self) -> u64 {
        self.total_branches
    }

    pub fn covered_branches(&self) -> u64 {
        self.covered_branches
    }

    pub fn total_functions(&self) -> u64 {
        self.total_functions
    }

    pub fn covered_functions(&self) -> u64 {
        self.covered_functions
    }

    /// Overall coverage, measured over statements; 100 when there are none.
    pub fn line_coverage(&self) -> f64 {
        percentage(self.covered_statements, self.total_statements)
    }

    /// Overall branch coverage; 100 when there are no branches.
    pub fn branch_coverage(&self) -> f64 {
        percentage(self.covered_branches, self.total_branches)
    }

    /// Overall function coverage; 100 when there are no functions.
    pub fn function_coverage(&self) -> f64 {
        percentage(self.covered_functions, self.total_functions)
    }
}

impl fmt::Display for CoverageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<50} {:>9} {:>9} {:>10}",
            "File", "Lines %", "Stmts %", "Uncovered"
        )?;
        for file in self.files.values() {
            writeln!(
                f,
                "{:<50} {:>8.1}% {:>8.1}% {:>10}",
                file.path,
                file.line_coverage(),
                file.statement_coverage(),
                file.lines_uncovered.len()
            )?;
        }
        writeln!(
            f,
            "\nTotal: {} files, statements {:.1}%, branches {:.1}%, functions {:.1}%",
            self.files.len(),
            self.line_coverage(),
            self.branch_coverage(),
            self.function_coverage()
        )
    }
}

pub(crate) fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 100.0;
    }
    part as f64 / whole as f64 * 100.0
}
