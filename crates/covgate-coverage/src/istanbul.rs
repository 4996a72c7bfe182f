//! Istanbul / Jest `coverage-final.json` normalization.
//!
//! Each top-level key is a source path mapping to statement, branch and
//! function maps plus their hit counters:
//!
//! ```json
//! { "/repo/src/app.js": {
//!     "statementMap": { "0": { "start": { "line": 1, "column": 0 }, "end": { … } } },
//!     "s": { "0": 3 },
//!     "branchMap": { "0": { "locations": [ { … }, { … } ] } },
//!     "b": { "0": [1, 0] },
//!     "fnMap": { "0": { … } },
//!     "f": { "0": 1 } } }
//! ```

use std::collections::HashMap;

use covgate_core::CovgateError;
use serde::de::IgnoredAny;
use serde::Deserialize;
use serde_json::Value;

use crate::model::{CoverageReport, FileCoverage};

/// Summary files carry an aggregate under this key.
const TOTAL_KEY: &str = "total";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IstanbulFile {
    #[serde(default)]
    statement_map: HashMap<String, Span>,
    #[serde(default)]
    s: HashMap<String, u64>,
    #[serde(default)]
    branch_map: HashMap<String, Branch>,
    #[serde(default)]
    b: HashMap<String, Vec<u64>>,
    #[serde(default)]
    fn_map: HashMap<String, IgnoredAny>,
    #[serde(default)]
    f: HashMap<String, u64>,
}

#[derive(Debug, Deserialize)]
struct Span {
    #[serde(default)]
    start: Option<Position>,
}

#[derive(Debug, Deserialize)]
struct Position {
    #[serde(default)]
    line: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct Branch {
    #[serde(default)]
    locations: Vec<IgnoredAny>,
}

/// Whether a path names test code rather than production code.
pub fn is_test_path(path: &str) -> bool {
    let lower = path.to_lowercase();
    lower.contains("test") || lower.contains("spec")
}

/// Normalize a parsed Istanbul report.
///
/// Test and spec files are left out entirely. A line is covered when any
/// statement starting on it was hit.
///
/// # Errors
///
/// Returns [`CovgateError::Parse`] if the document is not an object or a
/// production file entry has the wrong shape.
pub fn normalize(document: &Value) -> Result<CoverageReport, CovgateError> {
    let entries = document
        .as_object()
        .ok_or_else(|| CovgateError::Parse("istanbul report must be a JSON object".into()))?;

    let mut report = CoverageReport::default();
    for (path, entry) in entries {
        if path == TOTAL_KEY || is_test_path(path) {
            continue;
        }
        let file = IstanbulFile::deserialize(entry)
            .map_err(|e| CovgateError::Parse(format!("istanbul entry {path}: {e}")))?;
        report.insert(to_canonical(path, &file));
    }
    Ok(report)
}

fn to_canonical(path: &str, file: &IstanbulFile) -> FileCoverage {
    let mut coverage = FileCoverage::new(path);

    coverage.statements_total = file.statement_map.len() as u64;
    coverage.statements_covered = count_hit(file.s.values());

    coverage.branches_total = file
        .branch_map
        .values()
        .map(|branch| branch.locations.len() as u64)
        .sum();
    coverage.branches_covered = file
        .b
        .values()
        .map(|arms| count_hit(arms.iter()))
        .sum();

    coverage.functions_total = file.fn_map.len() as u64;
    coverage.functions_covered = count_hit(file.f.values());

    for (id, span) in &file.statement_map {
        let Some(line) = span.start.as_ref().and_then(|start| start.line) else {
            continue;
        };
        let hit = file.s.get(id).is_some_and(|&hits| hits > 0);
        coverage.mark_line(line, hit);
    }

    coverage
}

fn count_hit<'a>(hits: impl Iterator<Item = &'a u64>) -> u64 {
    hits.filter(|&&h| h > 0).count() as u64
}
