//! Report format detection, loading, and discovery.
//!
//! The two supported schemas are resolved once into a [`ReportFormat`] and
//! routed to their normalizer. Loading is total at the `load_*` level:
//! a missing file, invalid JSON, or an unrecognized shape is `None`, which
//! callers must not confuse with an empty report.

use std::fmt;
use std::path::{Path, PathBuf};

use covgate_core::CovgateError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::model::CoverageReport;
use crate::{coverage_py, istanbul};

/// Source suffixes that mark a top-level key as an Istanbul file entry.
const ISTANBUL_SOURCE_SUFFIXES: &[&str] = &[".js", ".ts", ".jsx", ".tsx"];

/// Conventional Istanbul report locations, relative to the project root.
pub const ISTANBUL_LOCATIONS: &[&str] = &[
    "coverage/coverage-final.json",
    "coverage/coverage-summary.json",
    ".coverage/coverage-final.json",
];

/// Conventional coverage.py report locations, relative to the project root.
pub const COVERAGE_PY_LOCATIONS: &[&str] =
    &["coverage.json", ".coverage.json", "htmlcov/coverage.json"];

/// Supported coverage report schemas.
///
/// # Examples
///
/// ```
/// use covgate_coverage::ReportFormat;
///
/// let fmt: ReportFormat = "jest".parse().unwrap();
/// assert_eq!(fmt, ReportFormat::Istanbul);
/// assert_eq!(ReportFormat::CoveragePy.to_string(), "coverage-py");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportFormat {
    /// Istanbul / Jest statement, branch and function hit maps.
    Istanbul,
    /// coverage.py / pytest-cov executed and missing line lists.
    CoveragePy,
}

impl ReportFormat {
    /// Normalize a parsed document of this format.
    ///
    /// # Errors
    ///
    /// Returns [`CovgateError::Parse`] when the document has the wrong shape.
    pub fn normalize(self, document: &Value) -> Result<CoverageReport, CovgateError> {
        match self {
            ReportFormat::Istanbul => istanbul::normalize(document),
            ReportFormat::CoveragePy => coverage_py::normalize(document),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportFormat::Istanbul => write!(f, "istanbul"),
            ReportFormat::CoveragePy => write!(f, "coverage-py"),
        }
    }
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "istanbul" | "jest" | "nyc" => Ok(ReportFormat::Istanbul),
            "coverage-py" | "coveragepy" | "pytest" | "python" => Ok(ReportFormat::CoveragePy),
            other => Err(format!("unknown report format: {other}")),
        }
    }
}

/// Guess the schema of a parsed report from its top-level keys.
///
/// # Examples
///
/// ```
/// use covgate_coverage::{detect_format, ReportFormat};
/// use serde_json::json;
///
/// assert_eq!(detect_format(&json!({ "src/a.ts": {} })), Some(ReportFormat::Istanbul));
/// assert_eq!(
///     detect_format(&json!({ "files": {}, "totals": {} })),
///     Some(ReportFormat::CoveragePy)
/// );
/// assert_eq!(detect_format(&json!({ "files": {} })), None);
/// ```
pub fn detect_format(document: &Value) -> Option<ReportFormat> {
    let object = document.as_object()?;
    let has_source_key = object.keys().any(|key| {
        ISTANBUL_SOURCE_SUFFIXES
            .iter()
            .any(|suffix| key.ends_with(suffix))
    });
    if has_source_key {
        return Some(ReportFormat::Istanbul);
    }
    if object.contains_key("files") && object.contains_key("totals") {
        return Some(ReportFormat::CoveragePy);
    }
    None
}

fn read_json(path: &Path) -> Result<Value, CovgateError> {
    if !path.exists() {
        return Err(CovgateError::FileNotFound(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Load a report, detecting its format from the content.
///
/// # Errors
///
/// [`CovgateError::FileNotFound`], [`CovgateError::Io`] and
/// [`CovgateError::Serialization`] for unreadable input;
/// [`CovgateError::Parse`] when the format is not recognized or the
/// document does not match it.
pub fn try_load_report(path: &Path) -> Result<CoverageReport, CovgateError> {
    let document = read_json(path)?;
    let format = detect_format(&document).ok_or_else(|| {
        CovgateError::Parse(format!(
            "{} is neither an istanbul nor a coverage.py report",
            path.display()
        ))
    })?;
    debug!(path = %path.display(), %format, "detected report format");
    format.normalize(&document)
}

/// Load a report of a known format.
///
/// # Errors
///
/// As [`try_load_report`], minus format detection.
pub fn try_load_report_as(path: &Path, format: ReportFormat) -> Result<CoverageReport, CovgateError> {
    let document = read_json(path)?;
    format.normalize(&document)
}

/// [`try_load_report`] with the error logged and dropped.
pub fn load_report(path: &Path) -> Option<CoverageReport> {
    try_load_report(path)
        .inspect_err(|e| debug!(path = %path.display(), error = %e, "no report"))
        .ok()
}

/// [`try_load_report_as`] with the error logged and dropped.
pub fn load_report_as(path: &Path, format: ReportFormat) -> Option<CoverageReport> {
    try_load_report_as(path, format)
        .inspect_err(|e| debug!(path = %path.display(), error = %e, %format, "no report"))
        .ok()
}

/// Find a report in the conventional locations under `root`.
///
/// Istanbul locations are tried before coverage.py ones.
pub fn discover_report(root: &Path) -> Option<(PathBuf, ReportFormat)> {
    let istanbul = ISTANBUL_LOCATIONS
        .iter()
        .map(|rel| (rel, ReportFormat::Istanbul));
    let coverage_py = COVERAGE_PY_LOCATIONS
        .iter()
        .map(|rel| (rel, ReportFormat::CoveragePy));

    istanbul.chain(coverage_py).find_map(|(rel, format)| {
        let candidate = root.join(rel);
        candidate.is_file().then_some((candidate, format))
    })
}

/// Load the explicit report if given, otherwise the discovered one.
///
/// An explicit path that cannot be loaded yields `None`; discovery is
/// only used when no path was supplied.
pub fn find_and_load(explicit: Option<&Path>, root: &Path) -> Option<CoverageReport> {
    match explicit {
        Some(path) => load_report(path),
        None => {
            let (path, format) = discover_report(root)?;
            debug!(path = %path.display(), %format, "discovered report");
            load_report_as(&path, format)
        }
    }
}
