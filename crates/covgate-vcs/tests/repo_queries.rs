use std::path::Path;
use std::process::Command;

use covgate_vcs::{BaseBranch, DiffStatus, GitRepo};

fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args([
            "-c",
            "user.name=Test Author",
            "-c",
            "user.email=author@example.com",
            "-c",
            "commit.gpgsign=false",
        ])
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

/// A repository on `main` with one commit containing `src/app.py` and `src/util.py`.
fn fixture_repo() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    git(root, &["init", "-q"]);
    git(root, &["symbolic-ref", "HEAD", "refs/heads/main"]);
    std::fs::create_dir_all(root.join("src")).unwrap();
    std::fs::write(root.join("src/app.py"), "a = 1\nb = 2\nc = 3\n").unwrap();
    std::fs::write(root.join("src/util.py"), "def helper():\n    return 42\n").unwrap();
    git(root, &["add", "."]);
    git(root, &["commit", "-q", "-m", "initial import"]);
    dir
}

#[test]
fn diff_reports_status_and_counts() {
    if !git_available() {
        return;
    }
    let dir = fixture_repo();
    let root = dir.path();

    std::fs::write(root.join("src/app.py"), "a = 1\nb = 20\nc = 3\nd = 4\n").unwrap();
    std::fs::write(root.join("src/new.py"), "x = 1\n").unwrap();
    git(root, &["add", "src/new.py"]);
    git(root, &["mv", "src/util.py", "src/helpers.py"]);

    let repo = GitRepo::new(root);
    let diffs = repo.diff("HEAD");

    let app = diffs.iter().find(|d| d.path == "src/app.py").unwrap();
    assert_eq!(app.status, DiffStatus::Modified);
    assert_eq!(app.additions, 2);
    assert_eq!(app.deletions, 1);

    let new = diffs.iter().find(|d| d.path == "src/new.py").unwrap();
    assert_eq!(new.status, DiffStatus::Added);
    assert_eq!(new.additions, 1);

    let renamed = diffs.iter().find(|d| d.path == "src/helpers.py").unwrap();
    assert_eq!(renamed.old_path(), Some("src/util.py"));
}

#[test]
fn changed_files_distinguishes_staged() {
    if !git_available() {
        return;
    }
    let dir = fixture_repo();
    let root = dir.path();

    std::fs::write(root.join("src/app.py"), "a = 10\n").unwrap();
    std::fs::write(root.join("src/util.py"), "def helper():\n    return 0\n").unwrap();
    git(root, &["add", "src/util.py"]);

    let repo = GitRepo::new(root);
    assert_eq!(repo.changed_files(false), vec!["src/app.py".to_string()]);
    assert_eq!(repo.changed_files(true), vec!["src/util.py".to_string()]);
}

#[test]
fn blame_returns_line_attribution() {
    if !git_available() {
        return;
    }
    let dir = fixture_repo();
    let repo = GitRepo::new(dir.path());

    let info = repo.blame("src/app.py", 2).unwrap();
    assert_eq!(info.author, "Test Author");
    assert_eq!(info.author_email, "author@example.com");
    assert_eq!(info.line_number, 2);
    assert_eq!(info.content, "b = 2");
    assert_eq!(info.commit_hash.len(), 40);

    assert!(repo.blame("src/app.py", 99).is_none());
    assert!(repo.blame("src/untracked.py", 1).is_none());
}

#[test]
fn recent_commits_include_changed_files() {
    if !git_available() {
        return;
    }
    let dir = fixture_repo();
    let root = dir.path();
    std::fs::write(root.join("src/app.py"), "a = 1\n").unwrap();
    git(root, &["commit", "-q", "-am", "trim app"]);

    let repo = GitRepo::new(root);
    let commits = repo.recent_commits(10, None);
    assert_eq!(commits.len(), 2);
    assert_eq!(commits[0].message, "trim app");
    assert_eq!(commits[0].files_changed, vec!["src/app.py".to_string()]);
    assert_eq!(commits[0].author, "Test Author");
    assert!(commits[0].hash.starts_with(&commits[0].short_hash));

    // The root commit lists its files too.
    let mut initial = commits[1].files_changed.clone();
    initial.sort();
    assert_eq!(initial, vec!["src/app.py".to_string(), "src/util.py".to_string()]);

    let history = repo.file_history("src/util.py", 5);
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].message, "initial import");

    assert_eq!(repo.recent_commits(1, None).len(), 1);
}

#[test]
fn branch_queries() {
    if !git_available() {
        return;
    }
    let dir = fixture_repo();
    let root = dir.path();
    let repo = GitRepo::new(root);

    assert!(repo.is_repository());
    assert_eq!(repo.current_branch().as_deref(), Some("main"));
    assert_eq!(repo.base_branch(), BaseBranch::Main);

    git(root, &["checkout", "-q", "-b", "feature"]);
    std::fs::write(root.join("src/app.py"), "changed\n").unwrap();
    git(root, &["commit", "-q", "-am", "feature work"]);

    let (base, head) = repo.commit_range(None);
    assert_eq!(head, "HEAD");
    assert_eq!(base.len(), 40, "merge base should be a full sha, got {base}");

    let (fallback, _) = repo.commit_range(Some("no-such-branch"));
    assert_eq!(fallback, "no-such-branch");
}

#[test]
fn master_only_repository() {
    if !git_available() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    git(root, &["init", "-q"]);
    git(root, &["symbolic-ref", "HEAD", "refs/heads/master"]);
    std::fs::write(root.join("a.py"), "x = 1\n").unwrap();
    git(root, &["add", "."]);
    git(root, &["commit", "-q", "-m", "init"]);

    assert_eq!(GitRepo::new(root).base_branch(), BaseBranch::Master);
}
