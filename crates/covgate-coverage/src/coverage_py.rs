//! coverage.py / pytest-cov `coverage.json` normalization.

use std::collections::BTreeMap;

use covgate_core::CovgateError;
use serde::Deserialize;
use serde_json::Value;

use crate::model::{CoverageReport, FileCoverage};

#[derive(Debug, Deserialize)]
struct Document {
    #[serde(default)]
    files: BTreeMap<String, Value>,
}

#[derive(Debug, Deserialize)]
struct PyFile {
    #[serde(default)]
    summary: Summary,
    #[serde(default)]
    executed_lines: Vec<u32>,
    #[serde(default)]
    missing_lines: Vec<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct Summary {
    #[serde(default)]
    num_statements: u64,
    #[serde(default)]
    covered_lines: u64,
    #[serde(default)]
    num_branches: u64,
    #[serde(default)]
    covered_branches: u64,
}

/// Normalize a parsed coverage.py JSON report.
///
/// Files whose path contains `test` (any case) are skipped. Function
/// counters are always zero; coverage.py does not report them.
///
/// # Errors
///
/// Returns [`CovgateError::Parse`] if the document or a production file
/// entry has the wrong shape.
pub fn normalize(document: &Value) -> Result<CoverageReport, CovgateError> {
    let doc = Document::deserialize(document)
        .map_err(|e| CovgateError::Parse(format!("coverage.py report: {e}")))?;

    let mut report = CoverageReport::default();
    for (path, entry) in &doc.files {
        if path.to_lowercase().contains("test") {
            continue;
        }
        let file = PyFile::deserialize(entry)
            .map_err(|e| CovgateError::Parse(format!("coverage.py entry {path}: {e}")))?;

        let mut coverage = FileCoverage::with_lines(
            path.as_str(),
            file.executed_lines.iter().copied(),
            file.missing_lines.iter().copied(),
        );
        coverage.statements_total = file.summary.num_statements;
        coverage.statements_covered = file.summary.covered_lines;
        coverage.branches_total = file.summary.num_branches;
        coverage.branches_covered = file.summary.covered_branches;
        report.insert(coverage);
    }
    Ok(report)
}
