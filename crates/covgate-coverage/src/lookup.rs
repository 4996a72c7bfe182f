//! Path lookups against a report whose keys may use a different prefix.

use tracing::debug;

use crate::model::CoverageReport;

fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// The report key that `path` refers to.
///
/// An exact key wins; otherwise the first key (in path order) with the same
/// file name is used.
pub fn resolve_path<'a>(report: &'a CoverageReport, path: &str) -> Option<&'a str> {
    if let Some((key, _)) = report.files().get_key_value(path) {
        return Some(key.as_str());
    }
    let wanted = file_name(path);
    if wanted.is_empty() {
        return None;
    }
    report
        .files()
        .keys()
        .find(|key| file_name(key) == wanted)
        .map(String::as_str)
}

fn normalized(path: &str) -> String {
    let path = path.replace('\\', "/");
    path.strip_prefix("./").map(str::to_string).unwrap_or(path)
}

/// Whether `longer` ends with `suffix` on a path-component boundary.
fn ends_with_components(longer: &str, suffix: &str) -> bool {
    longer.len() > suffix.len()
        && longer.ends_with(suffix)
        && longer[..longer.len() - suffix.len()].ends_with('/')
}

fn unique<'a>(mut matches: impl Iterator<Item = &'a String>) -> Result<Option<&'a str>, usize> {
    let Some(first) = matches.next() else {
        return Ok(None);
    };
    match matches.count() {
        0 => Ok(Some(first.as_str())),
        more => Err(more + 1),
    }
}

/// The report key a changed file refers to, or `None` when no key matches
/// it unambiguously.
///
/// Tried in order: the exact key; the single key ending in `/path`; the
/// single key that `path` ends with (a report rooted in a subdirectory of
/// the repository); the single key with the same file name. Several keys
/// matching at one step make the path unresolved.
///
/// # Examples
///
/// ```
/// use covgate_coverage::{resolve_changed_path, CoverageReport, FileCoverage};
///
/// let mut report = CoverageReport::default();
/// report.insert(FileCoverage::with_lines("/ci/pkg1/utils.py", [1], []));
/// report.insert(FileCoverage::with_lines("/ci/pkg2/utils.py", [], [1]));
/// assert_eq!(resolve_changed_path(&report, "pkg2/utils.py"), Some("/ci/pkg2/utils.py"));
/// assert_eq!(resolve_changed_path(&report, "other/utils.py"), None);
/// ```
pub fn resolve_changed_path<'a>(report: &'a CoverageReport, path: &str) -> Option<&'a str> {
    if let Some((key, _)) = report.files().get_key_value(path) {
        return Some(key.as_str());
    }
    let wanted = normalized(path);
    if wanted.is_empty() || wanted.ends_with('/') {
        return None;
    }
    let keys = report.files().keys();

    let steps: [(&str, Box<dyn Fn(&String) -> bool + '_>); 4] = [
        ("normalized", Box::new(|key: &String| normalized(key) == wanted)),
        (
            "key suffix",
            Box::new(|key: &String| ends_with_components(&normalized(key), &wanted)),
        ),
        (
            "path suffix",
            Box::new(|key: &String| ends_with_components(&wanted, &normalized(key))),
        ),
        (
            "file name",
            Box::new(|key: &String| file_name(key) == file_name(&wanted)),
        ),
    ];
    for (step, matches) in &steps {
        match unique(keys.clone().filter(|key| matches(*key))) {
            Ok(Some(key)) => return Some(key),
            Ok(None) => {}
            Err(count) => {
                debug!(path, step = %step, count, "ambiguous report path");
                return None;
            }
        }
    }
    None
}

/// Uncovered lines of `path`, ascending.
///
/// Empty both when the file is fully covered and when it is not in the
/// report; use [`resolve_path`] to tell the two apart.
///
/// # Examples
///
/// ```
/// use covgate_coverage::{uncovered_lines, CoverageReport, FileCoverage};
///
/// let mut report = CoverageReport::default();
/// report.insert(FileCoverage::with_lines("/abs/src/x.py", [1], [4, 2]));
/// assert_eq!(uncovered_lines(&report, "src/x.py"), vec![2, 4]);
/// assert!(uncovered_lines(&report, "src/y.py").is_empty());
/// ```
pub fn uncovered_lines(report: &CoverageReport, path: &str) -> Vec<u32> {
    resolve_path(report, path)
        .and_then(|key| report.get(key))
        .map(|file| file.lines_uncovered().iter().copied().collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FileCoverage;

    fn report(paths: &[&str]) -> CoverageReport {
        let mut report = CoverageReport::default();
        for (i, path) in paths.iter().enumerate() {
            report.insert(FileCoverage::with_lines(*path, [], [i as u32 + 1]));
        }
        report
    }

    #[test]
    fn exact_key_beats_basename() {
        let report = report(&["a/util.py", "util.py"]);
        assert_eq!(resolve_path(&report, "util.py"), Some("util.py"));
        assert_eq!(uncovered_lines(&report, "util.py"), vec![2]);
    }

    #[test]
    fn basename_fallback_takes_first_key() {
        let report = report(&["/z/src/util.py", "/a/lib/util.py"]);
        assert_eq!(resolve_path(&report, "src/util.py"), Some("/a/lib/util.py"));
    }

    #[test]
    fn windows_separators_are_understood() {
        let report = report(&["C:\\repo\\src\\app.ts"]);
        assert_eq!(resolve_path(&report, "src/app.ts"), Some("C:\\repo\\src\\app.ts"));
    }

    #[test]
    fn unknown_path_is_empty() {
        let report = report(&["src/app.ts"]);
        assert_eq!(resolve_path(&report, "src/other.ts"), None);
        assert!(uncovered_lines(&report, "src/other.ts").is_empty());
        assert_eq!(resolve_path(&report, "src/"), None);
        assert!(uncovered_lines(&CoverageReport::default(), "x.py").is_empty());
    }

    #[test]
    fn changed_path_prefers_component_suffix() {
        let report = report(&["/ci/build/pkg1/utils.py", "/ci/build/pkg2/utils.py"]);
        assert_eq!(
            resolve_changed_path(&report, "pkg2/utils.py"),
            Some("/ci/build/pkg2/utils.py")
        );
        assert_eq!(
            resolve_changed_path(&report, "./pkg1/utils.py"),
            Some("/ci/build/pkg1/utils.py")
        );
    }

    #[test]
    fn changed_path_never_guesses_between_same_names() {
        let report = report(&["/ci/build/pkg1/utils.py", "/ci/build/pkg2/utils.py"]);
        assert_eq!(resolve_changed_path(&report, "utils.py"), None);
        assert_eq!(resolve_changed_path(&report, "pkg3/utils.py"), None);
    }

    #[test]
    fn changed_path_suffix_needs_component_boundary() {
        let report = report(&["/ci/mypkg2/utils.py"]);
        // No `/pkg2/utils.py` key; the unique file name still matches.
        assert_eq!(resolve_changed_path(&report, "pkg2/utils.py"), Some("/ci/mypkg2/utils.py"));
        assert!(!ends_with_components("/ci/mypkg2/utils.py", "pkg2/utils.py"));
        assert!(ends_with_components("/ci/pkg2/utils.py", "pkg2/utils.py"));
    }

    #[test]
    fn changed_path_from_repository_root_matches_subproject_key() {
        let report = report(&["app/x.py", "lib/x.py"]);
        assert_eq!(resolve_changed_path(&report, "service/app/x.py"), Some("app/x.py"));
    }

    #[test]
    fn changed_path_with_windows_keys() {
        let report = report(&["C:\\repo\\pkg1\\a.ts", "C:\\repo\\pkg2\\a.ts"]);
        assert_eq!(resolve_changed_path(&report, "pkg2/a.ts"), Some("C:\\repo\\pkg2\\a.ts"));
    }

    #[test]
    fn fully_covered_file_is_empty_but_resolved() {
        let mut report = CoverageReport::default();
        report.insert(FileCoverage::with_lines("done.py", [1, 2], []));
        assert_eq!(resolve_path(&report, "done.py"), Some("done.py"));
        assert!(uncovered_lines(&report, "done.py").is_empty());
    }
}
