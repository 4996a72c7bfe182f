//! Coverage report normalization and delta coverage.
//!
//! Istanbul (`coverage-final.json`) and coverage.py (`coverage.json`)
//! reports are normalized into one [`CoverageReport`] model. On top of that
//! model this crate computes delta coverage between two snapshots, answers
//! per-file lookups, and locates companion test files for source files.

pub mod companion;
pub mod coverage_py;
pub mod delta;
pub mod format;
pub mod istanbul;
pub mod lookup;
pub mod model;

pub use companion::{find_test_file, should_skip, suggested_test_path};
pub use delta::{calculate_delta, delta_breakdown, DeltaSummary, FileDelta};
pub use format::{
    detect_format, discover_report, find_and_load, load_report, load_report_as, try_load_report,
    try_load_report_as, ReportFormat,
};
pub use lookup::{resolve_changed_path, resolve_path, uncovered_lines};
pub use model::{CoverageReport, FileCoverage};
