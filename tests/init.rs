use std::process::Command;

#[test]
fn init_creates_valid_toml() {
    let dir = tempfile::tempdir().unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_covgate"))
        .arg("init")
        .env_remove("COVGATE_CONFIG")
        .current_dir(dir.path())
        .output()
        .unwrap();

    assert!(output.status.success(), "covgate init failed: {}", String::from_utf8_lossy(&output.stderr));

    let config_path = dir.path().join(".covgate.toml");
    assert!(config_path.exists(), ".covgate.toml should exist");

    let content = std::fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("[coverage]"));
    assert!(content.contains("[git]"));
    assert!(content.contains("[enforcer]"));

    // Verify it's valid TOML that covgate-core can parse
    let config: covgate_core::CovgateConfig = toml::from_str(&content).unwrap();
    assert_eq!(config.coverage.threshold, 80.0);
}

#[test]
fn init_refuses_if_exists() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(".covgate.toml"), "# existing").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_covgate"))
        .arg("init")
        .env_remove("COVGATE_CONFIG")
        .current_dir(dir.path())
        .output()
        .unwrap();

    assert!(!output.status.success());
    let content = std::fs::read_to_string(dir.path().join(".covgate.toml")).unwrap();
    assert_eq!(content, "# existing");
}

#[test]
fn init_template_drives_check() {
    let dir = tempfile::tempdir().unwrap();
    let run = |args: &[&str]| {
        Command::new(env!("CARGO_BIN_EXE_covgate"))
            .args(args)
            .env_remove("COVGATE_CONFIG")
            .env_remove("RUST_LOG")
            .current_dir(dir.path())
            .output()
            .unwrap()
    };

    assert!(run(&["init"]).status.success());
    std::fs::write(
        dir.path().join("current.json"),
        r#"{ "files": { "src/cart.py": { "executed_lines": [1, 2, 3, 4], "missing_lines": [5] } }, "totals": {} }"#,
    )
    .unwrap();

    let output = run(&["check", "--report", "current.json", "--changed", "src/cart.py"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let out = String::from_utf8_lossy(&output.stdout);
    assert!(out.contains("80.0% (4/5 new lines)"));
    assert!(out.contains("threshold 80.0%"));

    std::fs::write(
        dir.path().join(".covgate.toml"),
        std::fs::read_to_string(dir.path().join(".covgate.toml"))
            .unwrap()
            .replace("threshold = 80.0", "threshold = 90.0"),
    )
    .unwrap();
    let output = run(&["check", "--report", "current.json", "--changed", "src/cart.py"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stdout).contains("threshold 90.0%"));
}
