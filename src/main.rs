use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use covgate_core::{CovgateConfig, OutputFormat, Verdict};
use covgate_coverage::{CoverageReport, DeltaSummary};
use covgate_vcs::{DiffStatus, GitRepo};

#[derive(Parser)]
#[command(
    name = "covgate",
    version,
    about = "Delta coverage gate for changed code",
    long_about = "covgate measures test coverage of the lines you changed, not the code you inherited.\n\n\
                   It reads Istanbul/Jest or coverage.py JSON reports, asks git which files\n\
                   changed, and fails when coverage of new lines is below a threshold.\n\n\
                   Examples:\n  \
                     covgate check                          Gate the current branch against main/master\n  \
                     covgate check --baseline base.json     Compare against a saved report\n  \
                     covgate delta --baseline a.json --current b.json\n  \
                     covgate uncovered src/cart.ts          List uncovered lines of a file\n  \
                     covgate tests src/cart.ts              Check for a companion test file"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file (default: $COVGATE_CONFIG, then .covgate.toml under --path)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        global = true,
        default_value = "text",
        long_help = "Output format for command results.\n\n\
                       Formats:\n  \
                         text      Human-readable tables and summaries (default)\n  \
                         json      Machine-readable JSON with camelCase keys\n  \
                         markdown  GitHub-flavored Markdown"
    )]
    format: OutputFormat,

    /// Enable debug logging on stderr (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Fail when coverage of changed lines is below the threshold
    #[command(long_about = "Fail when coverage of changed lines is below the threshold.\n\n\
        Loads the current report (--report, [coverage].report, or a conventional\n\
        location), determines changed files from git unless --changed is given, and\n\
        compares new lines against the baseline report. Without a baseline every\n\
        instrumented line of a changed file counts as new.\n\n\
        Exits 1 when the gate fails.\n\n\
        Examples:\n  covgate check\n  covgate check --base develop --threshold 90\n  covgate check --changed src/a.py --baseline base.json\n  covgate check --all-files")]
    Check {
        /// Project root (default: current directory)
        #[arg(long, default_value = ".")]
        path: PathBuf,
        /// Current coverage report
        #[arg(long)]
        report: Option<PathBuf>,
        /// Baseline coverage report
        #[arg(long)]
        baseline: Option<PathBuf>,
        /// Git ref to diff against (default: merge base with main/master)
        #[arg(long)]
        base: Option<String>,
        /// Use staged changes instead of the diff against the base
        #[arg(long)]
        staged: bool,
        /// Changed files; skips git entirely
        #[arg(long, num_args = 1..)]
        changed: Vec<String>,
        /// Gate on overall coverage instead of new lines
        #[arg(long)]
        all_files: bool,
        /// Minimum percentage (default: [coverage].threshold)
        #[arg(long)]
        threshold: Option<f64>,
    },
    /// Compute delta coverage between two reports
    #[command(long_about = "Compute delta coverage between two reports.\n\n\
        Prints the percentage of new lines in --current that are covered. Lines are\n\
        matched by number, so edits that shift code can make old lines look new.\n\n\
        Example:\n  covgate delta --baseline base.json --current coverage.json --changed src/a.py")]
    Delta {
        /// Baseline coverage report
        #[arg(long)]
        baseline: PathBuf,
        /// Current coverage report
        #[arg(long)]
        current: PathBuf,
        /// Restrict to these report paths
        #[arg(long, num_args = 1..)]
        changed: Vec<String>,
    },
    /// Show per-file coverage of a report
    Summary {
        /// Project root used for report discovery
        #[arg(long, default_value = ".")]
        path: PathBuf,
        /// Coverage report (default: discovered)
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// List uncovered lines of a file
    Uncovered {
        /// File to look up; matched by file name when the report uses another prefix
        file: String,
        /// Project root used for report discovery
        #[arg(long, default_value = ".")]
        path: PathBuf,
        /// Coverage report (default: discovered)
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Show files changed against a base ref
    Diff {
        /// Repository path (default: current directory)
        #[arg(long, default_value = ".")]
        path: PathBuf,
        /// Git ref to diff against (default: merge base with main/master)
        #[arg(long)]
        base: Option<String>,
    },
    /// List files with working-tree changes
    Changed {
        /// Repository path (default: current directory)
        #[arg(long, default_value = ".")]
        path: PathBuf,
        /// List staged changes instead of unstaged ones
        #[arg(long)]
        staged: bool,
    },
    /// Show who last touched a line
    Blame {
        /// File path relative to the repository root
        file: String,
        /// 1-indexed line number
        line: u32,
        /// Repository path (default: current directory)
        #[arg(long, default_value = ".")]
        path: PathBuf,
    },
    /// Show recent commits
    Log {
        /// Repository path (default: current directory)
        #[arg(long, default_value = ".")]
        path: PathBuf,
        /// Number of commits (default: 10)
        #[arg(long, short = 'n', default_value = "10")]
        count: usize,
        /// Only commits touching this file
        #[arg(long)]
        file: Option<String>,
    },
    /// Check that source files have companion test files
    #[command(long_about = "Check that source files have companion test files.\n\n\
        Looks for conventional test locations (tests/test_x.py, x.test.ts,\n\
        __tests__/x.test.tsx, ...). Test files, config files, and paths matching\n\
        [enforcer].skip_patterns are exempt. Exits 1 when a test file is missing.\n\n\
        Example:\n  covgate tests src/cart.ts app/orders.py")]
    Tests {
        /// Source files to check
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Project root (default: current directory)
        #[arg(long, default_value = ".")]
        path: PathBuf,
    },
    /// Create a default .covgate.toml configuration file
    #[command(long_about = "Create a default .covgate.toml configuration file.\n\n\
        Generates a template with all available options.\n\
        Fails if .covgate.toml already exists.")]
    Init,
    /// Generate shell completion scripts
    #[command(hide = true)]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

impl Command {
    /// The `--path` a command runs against; `.covgate.toml` is looked up there.
    fn project_root(&self) -> Option<&Path> {
        match self {
            Command::Check { path, .. }
            | Command::Summary { path, .. }
            | Command::Uncovered { path, .. }
            | Command::Diff { path, .. }
            | Command::Changed { path, .. }
            | Command::Blame { path, .. }
            | Command::Log { path, .. }
            | Command::Tests { path, .. } => Some(path.as_path()),
            Command::Delta { .. } | Command::Init | Command::Completions { .. } => None,
        }
    }
}

const DEFAULT_CONFIG: &str = r#"# covgate configuration
# See: covgate --help

[coverage]
# Minimum coverage percentage accepted by `covgate check`
threshold = 80.0
# Gate on coverage of new lines only (false: overall coverage)
delta_only = true
# Current report; discovered under coverage/ or as coverage.json when unset
# report = "coverage/coverage-final.json"
# Baseline report to compare against
# baseline = ".covgate/baseline.json"

[git]
# Per-call timeout for git commands, in seconds
timeout_secs = 30
# Base branch; main/master detection is used when unset
# base_branch = "develop"

[enforcer]
# Require companion test files in `covgate tests`
enabled = true
# Glob patterns on file names to exempt
skip_patterns = []
"#;

/// Result of a gate run, as printed by `check`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GateOutcome<'a> {
    mode: GateMode,
    percentage: f64,
    threshold: f64,
    verdict: Verdict,
    #[serde(skip_serializing_if = "Option::is_none")]
    delta: Option<&'a DeltaSummary>,
}

#[derive(Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
enum GateMode {
    Delta,
    Overall,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TestFileStatus {
    source: String,
    status: TestFileState,
    #[serde(skip_serializing_if = "Option::is_none")]
    test_file: Option<String>,
}

#[derive(Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
enum TestFileState {
    Found,
    Missing,
    Skipped,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Compress sorted line numbers into ranges: `3-5, 9`.
fn format_lines(lines: &[u32]) -> String {
    let mut parts = Vec::new();
    let mut iter = lines.iter().copied().peekable();
    while let Some(start) = iter.next() {
        let mut end = start;
        while let Some(next) = end.checked_add(1).filter(|next| iter.peek() == Some(next)) {
            end = next;
            iter.next();
        }
        if start == end {
            parts.push(start.to_string());
        } else {
            parts.push(format!("{start}-{end}"));
        }
    }
    parts.join(", ")
}

fn resolve_against(root: &Path, path: &Path) -> PathBuf {
    root.join(path)
}

fn load_current(root: &Path, explicit: Option<&Path>) -> Result<CoverageReport> {
    let explicit = explicit.map(|p| resolve_against(root, p));
    match covgate_coverage::find_and_load(explicit.as_deref(), root) {
        Some(report) => Ok(report),
        None => match explicit {
            Some(path) => {
                let cause = covgate_coverage::try_load_report(&path)
                    .err()
                    .map(|e| e.to_string())
                    .unwrap_or_default();
                miette::bail!(miette::miette!(
                    help = "Pass an Istanbul coverage-final.json or a coverage.py coverage.json",
                    "could not load coverage report {}: {cause}",
                    path.display()
                ))
            }
            None => miette::bail!(miette::miette!(
                help = "Run your tests with coverage enabled (jest --coverage, pytest --cov --cov-report=json),\n       or pass --report <path>",
                "no coverage report found under {}",
                root.display()
            )),
        },
    }
}

fn load_baseline(path: &Path) -> Result<CoverageReport> {
    covgate_coverage::try_load_report(path)
        .map_err(|e| miette::miette!("could not load baseline report {}: {e}", path.display()))
}

fn git_changed_files(
    repo: &GitRepo,
    base: Option<&str>,
    staged: bool,
) -> Result<Vec<String>> {
    if !repo.is_repository() {
        miette::bail!(miette::miette!(
            help = "Run covgate from inside a git repository, or list files with --changed",
            "{} is not a git repository",
            repo.repo_path().display()
        ));
    }
    if staged {
        return Ok(repo.changed_files(true));
    }
    let (base, _) = repo.commit_range(base);
    debug!(%base, "diffing against");
    Ok(repo
        .diff(&base)
        .into_iter()
        .filter(|diff| diff.status != DiffStatus::Deleted)
        .map(|diff| diff.path)
        .collect())
}

/// Map repository-relative paths onto the keys the report uses.
///
/// A path that matches no key, or several keys equally well, is dropped.
fn report_keys(report: &CoverageReport, paths: &[String]) -> Vec<String> {
    paths
        .iter()
        .filter_map(|path| match covgate_coverage::resolve_changed_path(report, path) {
            Some(key) => Some(key.to_string()),
            None => {
                debug!(path = %path, "changed file has no unambiguous coverage data");
                None
            }
        })
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn run_check(
    config: &CovgateConfig,
    format: OutputFormat,
    root: &Path,
    report: Option<&Path>,
    baseline: Option<&Path>,
    base: Option<&str>,
    staged: bool,
    changed: &[String],
    all_files: bool,
    threshold: Option<f64>,
) -> Result<Verdict> {
    let threshold = threshold.unwrap_or(config.coverage.threshold);
    if !(0.0..=100.0).contains(&threshold) {
        miette::bail!("--threshold must be within 0..=100, got {threshold}");
    }

    let current = load_current(root, report.or(config.coverage.report.as_deref()))?;

    if all_files || !config.coverage.delta_only {
        let percentage = current.line_coverage();
        let outcome = GateOutcome {
            mode: GateMode::Overall,
            percentage,
            threshold,
            verdict: Verdict::evaluate(percentage, threshold),
            delta: None,
        };
        print_gate(&outcome, format)?;
        return Ok(outcome.verdict);
    }

    let base_report = match baseline.or(config.coverage.baseline.as_deref()) {
        Some(path) => load_baseline(&resolve_against(root, path))?,
        None => CoverageReport::default(),
    };

    let changed_paths = if changed.is_empty() {
        let repo = GitRepo::from_config(root, &config.git);
        let base = base.or(config.git.base_branch.as_deref());
        git_changed_files(&repo, base, staged)?
    } else {
        changed.to_vec()
    };
    let keys = report_keys(&current, &changed_paths);
    debug!(changed = changed_paths.len(), matched = keys.len(), "changed files");

    let summary = covgate_coverage::delta_breakdown(&base_report, &current, Some(keys.as_slice()));
    let percentage = summary.percentage();
    let outcome = GateOutcome {
        mode: GateMode::Delta,
        percentage,
        threshold,
        verdict: Verdict::evaluate(percentage, threshold),
        delta: Some(&summary),
    };
    print_gate(&outcome, format)?;
    Ok(outcome.verdict)
}

fn print_gate(outcome: &GateOutcome<'_>, format: OutputFormat) -> Result<()> {
    let label = match outcome.mode {
        GateMode::Delta => "Delta coverage",
        GateMode::Overall => "Overall coverage",
    };
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(outcome).into_diagnostic()?);
        }
        OutputFormat::Markdown => {
            let badge = match outcome.verdict {
                Verdict::Pass => "✅ pass",
                Verdict::Fail => "❌ fail",
            };
            println!("## {label}: {:.1}% ({badge})\n", outcome.percentage);
            println!("Threshold: {:.1}%\n", outcome.threshold);
            if let Some(delta) = outcome.delta {
                println!(
                    "{} of {} new lines covered.\n",
                    delta.new_lines_covered, delta.new_lines_total
                );
                let missing: Vec<_> = delta.files.iter().filter(|f| !f.uncovered.is_empty()).collect();
                if !missing.is_empty() {
                    println!("| File | New lines | Uncovered |");
                    println!("|------|-----------|-----------|");
                    for file in missing {
                        println!(
                            "| `{}` | {} | {} |",
                            file.path,
                            file.new_lines(),
                            format_lines(&file.uncovered)
                        );
                    }
                }
            }
        }
        OutputFormat::Text => {
            match outcome.delta {
                Some(delta) => println!(
                    "{label}: {:.1}% ({}/{} new lines), threshold {:.1}%: {}",
                    outcome.percentage,
                    delta.new_lines_covered,
                    delta.new_lines_total,
                    outcome.threshold,
                    outcome.verdict
                ),
                None => println!(
                    "{label}: {:.1}%, threshold {:.1}%: {}",
                    outcome.percentage, outcome.threshold, outcome.verdict
                ),
            }
            if let Some(delta) = outcome.delta {
                for file in delta.files.iter().filter(|f| !f.uncovered.is_empty()) {
                    println!("  {}: {}", file.path, format_lines(&file.uncovered));
                }
            }
        }
    }
    Ok(())
}

fn print_summary(report: &CoverageReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report).into_diagnostic()?);
        }
        OutputFormat::Markdown => {
            println!("| File | Lines | Statements | Uncovered |");
            println!("|------|-------|------------|-----------|");
            for file in report.files().values() {
                let uncovered: Vec<u32> = file.lines_uncovered().iter().copied().collect();
                println!(
                    "| `{}` | {:.1}% | {:.1}% | {} |",
                    file.path,
                    file.line_coverage(),
                    file.statement_coverage(),
                    format_lines(&uncovered)
                );
            }
            println!(
                "\n**Total:** statements {:.1}%, branches {:.1}%, functions {:.1}%",
                report.line_coverage(),
                report.branch_coverage(),
                report.function_coverage()
            );
        }
        OutputFormat::Text => print!("{report}"),
    }
    Ok(())
}

fn run_tests(
    config: &CovgateConfig,
    format: OutputFormat,
    root: &Path,
    files: &[PathBuf],
) -> Result<bool> {
    let statuses: Vec<TestFileStatus> = files
        .iter()
        .map(|source| {
            let display = source.to_string_lossy().into_owned();
            if covgate_coverage::should_skip(&display, &config.enforcer.skip_patterns) {
                return TestFileStatus {
                    source: display,
                    status: TestFileState::Skipped,
                    test_file: None,
                };
            }
            match covgate_coverage::find_test_file(root, source) {
                Some(found) => TestFileStatus {
                    source: display,
                    status: TestFileState::Found,
                    test_file: Some(
                        found
                            .strip_prefix(root)
                            .unwrap_or(found.as_path())
                            .to_string_lossy()
                            .into_owned(),
                    ),
                },
                None => TestFileStatus {
                    source: display,
                    status: TestFileState::Missing,
                    test_file: Some(covgate_coverage::suggested_test_path(source)),
                },
            }
        })
        .collect();

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&statuses).into_diagnostic()?);
        }
        OutputFormat::Markdown => {
            println!("| Source | Status | Test file |");
            println!("|--------|--------|-----------|");
            for s in &statuses {
                let status = match s.status {
                    TestFileState::Found => "found",
                    TestFileState::Missing => "missing",
                    TestFileState::Skipped => "skipped",
                };
                println!(
                    "| `{}` | {status} | {} |",
                    s.source,
                    s.test_file.as_deref().unwrap_or("")
                );
            }
        }
        OutputFormat::Text => {
            for s in &statuses {
                match (s.status, s.test_file.as_deref()) {
                    (TestFileState::Found, Some(test)) => println!("ok       {} -> {test}", s.source),
                    (TestFileState::Missing, Some(test)) => {
                        println!("missing  {} (create {test})", s.source)
                    }
                    _ => println!("skipped  {}", s.source),
                }
            }
        }
    }

    let missing = statuses
        .iter()
        .any(|s| s.status == TestFileState::Missing);
    Ok(!missing || !config.enforcer.enabled)
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .into_diagnostic()?;
    human_panic::setup_panic!();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cwd = std::env::current_dir().into_diagnostic()?;
    let project_root = cli
        .command
        .as_ref()
        .and_then(Command::project_root)
        .map_or_else(|| cwd.clone(), |path| cwd.join(path));
    let config = CovgateConfig::load(cli.config.as_deref(), &project_root)?;
    debug!(format = %cli.format, threshold = config.coverage.threshold, "configuration loaded");

    match cli.command {
        None => {
            Cli::command().print_help().into_diagnostic()?;
        }
        Some(Command::Check {
            ref path,
            ref report,
            ref baseline,
            ref base,
            staged,
            ref changed,
            all_files,
            threshold,
        }) => {
            let verdict = run_check(
                &config,
                cli.format,
                path,
                report.as_deref(),
                baseline.as_deref(),
                base.as_deref(),
                staged,
                changed,
                all_files,
                threshold,
            )?;
            if verdict == Verdict::Fail {
                std::process::exit(verdict.exit_code());
            }
        }
        Some(Command::Delta {
            ref baseline,
            ref current,
            ref changed,
        }) => {
            let base = load_baseline(baseline)?;
            let current = match covgate_coverage::try_load_report(current) {
                Ok(report) => report,
                Err(e) => miette::bail!("could not load report {}: {e}", current.display()),
            };
            let filter = (!changed.is_empty()).then_some(changed.as_slice());
            let summary = covgate_coverage::delta_breakdown(&base, &current, filter);
            match cli.format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&summary).into_diagnostic()?);
                }
                OutputFormat::Markdown => {
                    println!(
                        "**Delta coverage:** {:.1}% ({}/{} new lines)",
                        summary.percentage(),
                        summary.new_lines_covered,
                        summary.new_lines_total
                    );
                }
                OutputFormat::Text => println!("{:.1}", summary.percentage()),
            }
        }
        Some(Command::Summary {
            ref path,
            ref report,
        }) => {
            let report = load_current(path, report.as_deref().or(config.coverage.report.as_deref()))?;
            print_summary(&report, cli.format)?;
        }
        Some(Command::Uncovered {
            ref file,
            ref path,
            ref report,
        }) => {
            let report = load_current(path, report.as_deref().or(config.coverage.report.as_deref()))?;
            let resolved = covgate_coverage::resolve_path(&report, file);
            let lines = covgate_coverage::uncovered_lines(&report, file);
            match cli.format {
                OutputFormat::Json => {
                    let value = serde_json::json!({
                        "file": file,
                        "reportPath": resolved,
                        "uncoveredLines": lines,
                    });
                    println!("{}", serde_json::to_string_pretty(&value).into_diagnostic()?);
                }
                OutputFormat::Markdown | OutputFormat::Text => match resolved {
                    None => eprintln!("{file}: no coverage data"),
                    Some(_) if lines.is_empty() => println!("{file}: fully covered"),
                    Some(_) => println!("{file}: {}", format_lines(&lines)),
                },
            }
        }
        Some(Command::Diff { ref path, ref base }) => {
            let repo = GitRepo::from_config(path, &config.git);
            let base = base.as_deref().or(config.git.base_branch.as_deref());
            let (base, _) = repo.commit_range(base);
            let diffs = repo.diff(&base);
            match cli.format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&diffs).into_diagnostic()?);
                }
                OutputFormat::Markdown => {
                    println!("| Status | File | + | - |");
                    println!("|--------|------|---|---|");
                    for d in &diffs {
                        println!("| {} | `{}` | {} | {} |", d.status, d.path, d.additions, d.deletions);
                    }
                }
                OutputFormat::Text => {
                    for d in &diffs {
                        match d.old_path() {
                            Some(old) => println!(
                                "{}  {old} -> {}  +{} -{}",
                                d.status.code(),
                                d.path,
                                d.additions,
                                d.deletions
                            ),
                            None => println!(
                                "{}  {}  +{} -{}",
                                d.status.code(),
                                d.path,
                                d.additions,
                                d.deletions
                            ),
                        }
                    }
                }
            }
        }
        Some(Command::Changed { ref path, staged }) => {
            let files = GitRepo::from_config(path, &config.git).changed_files(staged);
            match cli.format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&files).into_diagnostic()?);
                }
                OutputFormat::Markdown => {
                    for f in &files {
                        println!("- `{f}`");
                    }
                }
                OutputFormat::Text => {
                    for f in &files {
                        println!("{f}");
                    }
                }
            }
        }
        Some(Command::Blame {
            ref file,
            line,
            ref path,
        }) => {
            let repo = GitRepo::from_config(path, &config.git);
            let Some(info) = repo.blame(file, line) else {
                miette::bail!(miette::miette!(
                    help = "The file must be tracked by git and the line must exist",
                    "no blame information for {file}:{line}"
                ));
            };
            match cli.format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&info).into_diagnostic()?);
                }
                OutputFormat::Markdown | OutputFormat::Text => {
                    let short = info.commit_hash.get(..8).unwrap_or(info.commit_hash.as_str());
                    println!(
                        "{short} {} <{}> {}  {}:{}",
                        info.author, info.author_email, info.date, file, info.line_number
                    );
                    println!("    {}", info.content);
                }
            }
        }
        Some(Command::Log {
            ref path,
            count,
            ref file,
        }) => {
            let commits = GitRepo::from_config(path, &config.git).recent_commits(count, file.as_deref());
            match cli.format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&commits).into_diagnostic()?);
                }
                OutputFormat::Markdown => {
                    for c in &commits {
                        println!(
                            "- `{}` {} ({}, {}, {} files)",
                            c.short_hash,
                            c.message,
                            c.author,
                            c.date,
                            c.files_changed.len()
                        );
                    }
                }
                OutputFormat::Text => {
                    for c in &commits {
                        println!("{} {} {} {}", c.short_hash, c.date, c.author, c.message);
                        for f in &c.files_changed {
                            println!("    {f}");
                        }
                    }
                }
            }
        }
        Some(Command::Tests {
            ref files,
            ref path,
        }) => {
            if !run_tests(&config, cli.format, path, files)? {
                std::process::exit(1);
            }
        }
        Some(Command::Init) => {
            let path = Path::new(covgate_core::DEFAULT_CONFIG_FILE);
            if path.exists() {
                miette::bail!("{} already exists", covgate_core::DEFAULT_CONFIG_FILE);
            }
            std::fs::write(path, DEFAULT_CONFIG).into_diagnostic()?;
            println!(
                "Created {} with default configuration",
                covgate_core::DEFAULT_CONFIG_FILE
            );
        }
        Some(Command::Completions { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "covgate", &mut std::io::stdout());
        }
    }

    Ok(())
}
