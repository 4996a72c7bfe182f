use std::path::Path;
use std::process::{Command, Output};

const BASELINE: &str = r#"{
  "files": {
    "app/x.py": {
      "executed_lines": [1, 2],
      "missing_lines": [3],
      "summary": { "covered_lines": 2, "num_statements": 3, "num_branches": 0, "covered_branches": 0 }
    }
  },
  "totals": { "covered_lines": 2, "num_statements": 3 }
}"#;

const CURRENT: &str = r#"{
  "files": {
    "app/x.py": {
      "executed_lines": [1, 2, 4],
      "missing_lines": [3, 5],
      "summary": { "covered_lines": 3, "num_statements": 5, "num_branches": 0, "covered_branches": 0 }
    },
    "app/fresh.py": {
      "executed_lines": [1, 2, 3],
      "missing_lines": [],
      "summary": { "covered_lines": 3, "num_statements": 3, "num_branches": 0, "covered_branches": 0 }
    }
  },
  "totals": { "covered_lines": 6, "num_statements": 8 }
}"#;

fn project() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("base.json"), BASELINE).unwrap();
    std::fs::write(dir.path().join("current.json"), CURRENT).unwrap();
    dir
}

fn covgate(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_covgate"))
        .args(args)
        .env_remove("COVGATE_CONFIG")
        .env_remove("RUST_LOG")
        .current_dir(dir)
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn check_passes_at_threshold() {
    let dir = project();
    let output = covgate(
        dir.path(),
        &[
            "check", "--report", "current.json", "--baseline", "base.json", "--threshold", "50",
            "--changed", "app/x.py",
        ],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout(&output).contains("Delta coverage: 50.0% (1/2 new lines)"));
}

#[test]
fn check_fails_below_threshold_and_lists_lines() {
    let dir = project();
    let output = covgate(
        dir.path(),
        &[
            "check", "--report", "current.json", "--baseline", "base.json", "--threshold", "80",
            "--changed", "app/x.py",
        ],
    );
    assert_eq!(output.status.code(), Some(1));
    let out = stdout(&output);
    assert!(out.contains("fail"));
    assert!(out.contains("app/x.py: 5"));
}

#[test]
fn check_without_baseline_treats_changed_files_as_new() {
    let dir = project();
    let output = covgate(
        dir.path(),
        &["check", "--report", "current.json", "--threshold", "80", "--changed", "app/fresh.py"],
    );
    assert!(output.status.success());
    assert!(stdout(&output).contains("100.0% (3/3 new lines)"));
}

#[test]
fn check_json_output() {
    let dir = project();
    let output = covgate(
        dir.path(),
        &[
            "--format", "json", "check", "--report", "current.json", "--baseline", "base.json",
            "--threshold", "80", "--changed", "app/x.py", "app/fresh.py",
        ],
    );
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["mode"], "delta");
    assert_eq!(value["verdict"], "pass");
    assert_eq!(value["delta"]["newLinesTotal"], 5);
    assert_eq!(value["delta"]["newLinesCovered"], 4);
    assert_eq!(value["delta"]["files"][1]["uncovered"], serde_json::json!([5]));
}

#[test]
fn check_all_files_uses_overall_coverage() {
    let dir = project();
    let output = covgate(
        dir.path(),
        &["check", "--report", "current.json", "--all-files", "--threshold", "75"],
    );
    assert!(output.status.success());
    assert!(stdout(&output).contains("Overall coverage: 75.0%"));
}

#[test]
fn check_reads_threshold_from_config() {
    let dir = project();
    std::fs::write(
        dir.path().join(".covgate.toml"),
        "[coverage]\nthreshold = 40.0\nreport = \"current.json\"\nbaseline = \"base.json\"\n",
    )
    .unwrap();
    let output = covgate(dir.path(), &["check", "--changed", "app/x.py"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout(&output).contains("threshold 40.0%"));
}

#[test]
fn check_scores_the_changed_file_not_a_namesake() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("cov.json"),
        r#"{
  "files": {
    "/ci/build/pkg1/utils.py": { "executed_lines": [1, 2, 3], "missing_lines": [] },
    "/ci/build/pkg2/utils.py": { "executed_lines": [], "missing_lines": [1, 2, 3] }
  },
  "totals": {}
}"#,
    )
    .unwrap();
    let output = covgate(
        dir.path(),
        &[
            "check", "--report", "cov.json", "--threshold", "80", "--changed", "pkg2/utils.py",
            "--format", "json",
        ],
    );
    assert_eq!(output.status.code(), Some(1));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["percentage"], 0.0);
    assert_eq!(value["delta"]["files"][0]["path"], "/ci/build/pkg2/utils.py");
    assert_eq!(value["delta"]["files"].as_array().map(Vec::len), Some(1));
}

#[test]
fn check_drops_a_path_shared_by_several_report_files() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("cov.json"),
        r#"{
  "files": {
    "/ci/build/pkg1/utils.py": { "executed_lines": [1, 2, 3], "missing_lines": [] },
    "/ci/build/pkg2/utils.py": { "executed_lines": [], "missing_lines": [1, 2, 3] }
  },
  "totals": {}
}"#,
    )
    .unwrap();
    let output = covgate(
        dir.path(),
        &["check", "--report", "cov.json", "--changed", "utils.py", "--format", "json"],
    );
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["delta"]["newLinesTotal"], 0);
}

#[test]
fn check_reads_config_from_project_path() {
    let dir = project();
    let sub = dir.path().join("service");
    std::fs::create_dir_all(&sub).unwrap();
    std::fs::write(sub.join("base.json"), BASELINE).unwrap();
    std::fs::write(sub.join("current.json"), CURRENT).unwrap();
    std::fs::write(
        sub.join(".covgate.toml"),
        "[coverage]\nthreshold = 40.0\nreport = \"current.json\"\nbaseline = \"base.json\"\n",
    )
    .unwrap();
    let output = covgate(dir.path(), &["check", "--path", "service", "--changed", "app/x.py"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout(&output).contains("threshold 40.0%"));
}

#[test]
fn check_without_report_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = covgate(dir.path(), &["check", "--changed", "app/x.py"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("no coverage report found"));
}

#[test]
fn missing_config_file_is_an_error() {
    let dir = project();
    let output = Command::new(env!("CARGO_BIN_EXE_covgate"))
        .args(["summary", "--report", "current.json"])
        .env("COVGATE_CONFIG", dir.path().join("nope.toml"))
        .current_dir(dir.path())
        .output()
        .unwrap();
    assert!(!output.status.success());
}

#[test]
fn delta_prints_percentage() {
    let dir = project();
    let output = covgate(
        dir.path(),
        &["delta", "--baseline", "base.json", "--current", "current.json", "--changed", "app/x.py"],
    );
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "50.0");
}

#[test]
fn uncovered_matches_by_file_name() {
    let dir = project();
    let output = covgate(dir.path(), &["uncovered", "x.py", "--report", "current.json"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "x.py: 3, 5");
}

#[test]
fn summary_discovers_conventional_report() {
    let dir = project();
    std::fs::write(dir.path().join("coverage.json"), CURRENT).unwrap();
    let output = covgate(dir.path(), &["summary"]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("app/fresh.py"));
    assert!(out.contains("Total: 2 files"));
}

#[test]
fn tests_command_reports_missing_companions() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    std::fs::create_dir_all(root.join("app")).unwrap();
    std::fs::create_dir_all(root.join("tests")).unwrap();
    std::fs::write(root.join("app/orders.py"), "").unwrap();
    std::fs::write(root.join("app/cart.py"), "").unwrap();
    std::fs::write(root.join("tests/test_orders.py"), "").unwrap();

    let ok = covgate(root, &["tests", "app/orders.py", "app/__init__.py"]);
    assert!(ok.status.success());
    let out = stdout(&ok);
    assert!(out.contains("tests/test_orders.py"));
    assert!(out.contains("skipped  app/__init__.py"));

    let missing = covgate(root, &["tests", "app/cart.py"]);
    assert_eq!(missing.status.code(), Some(1));
    assert!(stdout(&missing).contains("create tests/test_cart.py"));
}

#[test]
fn tests_command_passes_when_enforcer_disabled() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(".covgate.toml"), "[enforcer]\nenabled = false\n").unwrap();
    let output = covgate(dir.path(), &["tests", "app/cart.py"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("missing"));
}
