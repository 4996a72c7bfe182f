//! Locating the test file that accompanies a source file.

use std::path::{Path, PathBuf};

use glob::Pattern;
use tracing::debug;

/// Candidate test locations per source extension, most conventional first.
///
/// `{name}` is the file stem and `{dir}` the directory of the source file.
const TEST_LOCATIONS: &[(&str, &[&str])] = &[
    (
        "py",
        &[
            "tests/test_{name}.py",
            "tests/{name}_test.py",
            "{dir}/test_{name}.py",
            "test_{name}.py",
            "{name}_test.py",
        ],
    ),
    (
        "ts",
        &[
            "__tests__/{name}.test.ts",
            "{name}.test.ts",
            "{name}.spec.ts",
            "{dir}/__tests__/{name}.test.ts",
            "tests/{name}.test.ts",
        ],
    ),
    (
        "tsx",
        &[
            "__tests__/{name}.test.tsx",
            "{name}.test.tsx",
            "{name}.spec.tsx",
            "{dir}/__tests__/{name}.test.tsx",
            "tests/{name}.test.tsx",
        ],
    ),
    (
        "js",
        &[
            "__tests__/{name}.test.js",
            "{name}.test.js",
            "{name}.spec.js",
            "{dir}/__tests__/{name}.test.js",
            "tests/{name}.test.js",
        ],
    ),
    (
        "jsx",
        &[
            "__tests__/{name}.test.jsx",
            "{name}.test.jsx",
            "{name}.spec.jsx",
            "{dir}/__tests__/{name}.test.jsx",
            "tests/{name}.test.jsx",
        ],
    ),
];

/// Path fragments that mark a file as not needing its own tests.
const SKIP_PATH_FRAGMENTS: &[&str] = &[
    "test",
    "spec",
    "__tests__",
    ".claude",
    "node_modules",
    ".git",
    "dist",
    "build",
    "coverage",
];

/// File name fragments for config, type declaration and package glue files.
const SKIP_NAME_FRAGMENTS: &[&str] = &[
    ".config.",
    ".d.ts",
    "index.",
    "__init__",
    "setup.py",
    "conftest.py",
];

/// Directories searched for a test file of the same name.
const TEST_DIRS: &[&str] = &["tests", "test", "__tests__", "spec"];

fn locations_for(path: &Path) -> Option<&'static [&'static str]> {
    let ext = path.extension()?.to_str()?;
    TEST_LOCATIONS
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, locations)| *locations)
}

fn expand(template: &str, source: &Path) -> String {
    let name = source
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    let dir = match source.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_string_lossy(),
        _ => ".".into(),
    };
    template.replace("{name}", &name).replace("{dir}", &dir)
}

/// Whether `path` is exempt from needing a companion test file.
///
/// Test code, vendored and generated directories, config and package glue
/// files, unsupported extensions, and file names matching any of
/// `extra_patterns` (glob syntax) are exempt.
///
/// # Examples
///
/// ```
/// use covgate_coverage::should_skip;
///
/// assert!(!should_skip("src/orders.py", &[]));
/// assert!(should_skip("src/__init__.py", &[]));
/// assert!(should_skip("src/generated_api.ts", &["generated_*".to_string()]));
/// ```
pub fn should_skip(path: &str, extra_patterns: &[String]) -> bool {
    let lower = path.to_lowercase();
    if let Some(fragment) = SKIP_PATH_FRAGMENTS.iter().find(|f| lower.contains(*f)) {
        debug!(path, fragment = %fragment, "skipped by path");
        return true;
    }

    let path_ref = Path::new(path);
    let name = path_ref
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let lower_name = name.to_lowercase();
    if let Some(fragment) = SKIP_NAME_FRAGMENTS.iter().find(|f| lower_name.contains(*f)) {
        debug!(path, fragment = %fragment, "skipped by file name");
        return true;
    }

    if locations_for(path_ref).is_none() {
        debug!(path, "not a source extension");
        return true;
    }

    extra_patterns.iter().any(|raw| match Pattern::new(raw) {
        Ok(pattern) => pattern.matches(&name),
        Err(e) => {
            debug!(pattern = %raw, error = %e, "ignoring invalid skip pattern");
            false
        }
    })
}

/// Find an existing test file for `source`, resolving candidates under `root`.
///
/// Each conventional location is tried in order; for each one, a file of
/// the same name under the common test directories is also accepted.
pub fn find_test_file(root: &Path, source: &Path) -> Option<PathBuf> {
    for template in locations_for(source)? {
        let relative = PathBuf::from(expand(template, source));
        let candidate = root.join(&relative);
        if candidate.is_file() {
            return Some(candidate);
        }
        let file_name = relative.file_name()?;
        for dir in TEST_DIRS {
            let alternate = root.join(dir).join(file_name);
            if alternate.is_file() {
                return Some(alternate);
            }
        }
    }
    None
}

/// Where a test for `source` should be created.
///
/// # Examples
///
/// ```
/// use covgate_coverage::suggested_test_path;
/// use std::path::Path;
///
/// assert_eq!(suggested_test_path(Path::new("src/cart.ts")), "__tests__/cart.test.ts");
/// assert_eq!(suggested_test_path(Path::new("app/orders.py")), "tests/test_orders.py");
/// ```
pub fn suggested_test_path(source: &Path) -> String {
    match locations_for(source) {
        Some(locations) => expand(locations[0], source),
        None => expand("tests/test_{name}.py", source),
    }
}
