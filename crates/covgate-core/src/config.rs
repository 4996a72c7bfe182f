use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::CovgateError;

/// Environment variable that points at an alternative config file.
pub const CONFIG_ENV_VAR: &str = "COVGATE_CONFIG";

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".covgate.toml";

/// Top-level configuration loaded from `.covgate.toml`.
///
/// Supports layered resolution: CLI flags > env vars > local config > defaults.
/// The value is passed explicitly to whatever needs it; nothing in the
/// coverage engine reads configuration on its own.
///
/// # Examples
///
/// ```
/// use covgate_core::CovgateConfig;
///
/// let config = CovgateConfig::default();
/// assert_eq!(config.coverage.threshold, 80.0);
/// assert!(config.coverage.delta_only);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CovgateConfig {
    /// Gate thresholds and report locations.
    #[serde(default)]
    pub coverage: CoverageConfig,
    /// Git invocation settings.
    #[serde(default)]
    pub git: GitConfig,
    /// Companion test-file enforcement.
    #[serde(default)]
    pub enforcer: EnforcerConfig,
}

impl CovgateConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`CovgateError::Io`] if the file cannot be read, or
    /// [`CovgateError::Toml`] if the content is not valid TOML.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use covgate_core::CovgateConfig;
    /// use std::path::Path;
    ///
    /// let config = CovgateConfig::from_file(Path::new(".covgate.toml")).unwrap();
    /// ```
    pub fn from_file(path: &Path) -> Result<Self, CovgateError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`CovgateError::Toml`] if parsing fails, or
    /// [`CovgateError::Config`] if a value is out of range.
    ///
    /// # Examples
    ///
    /// ```
    /// use covgate_core::CovgateConfig;
    ///
    /// let toml = r#"
    /// [coverage]
    /// threshold = 90.0
    /// "#;
    /// let config = CovgateConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.coverage.threshold, 90.0);
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, CovgateError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the config file to use, if any.
    ///
    /// An explicit path wins, then `$COVGATE_CONFIG`, then `.covgate.toml`
    /// in `cwd` when it exists.
    pub fn locate(explicit: Option<&Path>, cwd: &Path) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if !path.is_empty() {
                return Some(PathBuf::from(path));
            }
        }
        let local = cwd.join(DEFAULT_CONFIG_FILE);
        local.exists().then_some(local)
    }

    /// Load the resolved config file, or defaults when none exists.
    ///
    /// # Errors
    ///
    /// Propagates read and parse failures of a file that was located.
    pub fn load(explicit: Option<&Path>, cwd: &Path) -> Result<Self, CovgateError> {
        match Self::locate(explicit, cwd) {
            Some(path) if path.exists() => Self::from_file(&path),
            Some(path) => Err(CovgateError::FileNotFound(path)),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<(), CovgateError> {
        let threshold = self.coverage.threshold;
        if !(0.0..=100.0).contains(&threshold) {
            return Err(CovgateError::Config(format!(
                "coverage.threshold must be within 0..=100, got {threshold}"
            )));
        }
        if self.git.timeout_secs == 0 {
            return Err(CovgateError::Config(
                "git.timeout_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Coverage gate settings.
///
/// # Examples
///
/// ```
/// use covgate_core::CoverageConfig;
///
/// let config = CoverageConfig::default();
/// assert!(config.report.is_none());
/// assert!(config.baseline.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageConfig {
    /// Minimum coverage percentage the gate accepts (default: 80.0).
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Gate on coverage of new lines only rather than overall coverage (default: true).
    #[serde(default = "default_delta_only")]
    pub delta_only: bool,
    /// Current coverage report; auto-discovered when unset.
    pub report: Option<PathBuf>,
    /// Baseline coverage report to diff against.
    pub baseline: Option<PathBuf>,
}

fn default_threshold() -> f64 {
    80.0
}

fn default_delta_only() -> bool {
    true
}

impl Default for CoverageConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            delta_only: default_delta_only(),
            report: None,
            baseline: None,
        }
    }
}

/// Git invocation settings.
///
/// # Examples
///
/// ```
/// use covgate_core::GitConfig;
/// use std::time::Duration;
///
/// let config = GitConfig::default();
/// assert_eq!(config.timeout(), Duration::from_secs(30));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitConfig {
    /// Per-call timeout in seconds (default: 30).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Base branch override; `main`/`master` detection is used when unset.
    pub base_branch: Option<String>,
}

fn default_timeout_secs() -> u64 {
    30
}

impl GitConfig {
    /// Per-call timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            base_branch: None,
        }
    }
}

/// Companion test-file enforcement settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnforcerConfig {
    /// Whether `covgate tests` checks anything at all (default: true).
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Extra glob patterns matched against file names to skip.
    #[serde(default)]
    pub skip_patterns: Vec<String>,
}

fn default_enabled() -> bool {
    true
}

impl Default for EnforcerConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            skip_patterns: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = CovgateConfig::default();
        assert_eq!(config.coverage.threshold, 80.0);
        assert!(config.coverage.delta_only);
        assert!(config.coverage.report.is_none());
        assert_eq!(config.git.timeout_secs, 30);
        assert!(config.git.base_branch.is_none());
        assert!(config.enforcer.enabled);
        assert!(config.enforcer.skip_patterns.is_empty());
    }

    #[test]
    fn parse_full_toml() {
        let toml = r#"
[coverage]
threshold = 65.5
delta_only = false
report = "coverage/coverage-final.json"
baseline = ".covgate/baseline.json"

[git]
timeout_secs = 5
base_branch = "develop"

[enforcer]
enabled = false
skip_patterns = ["*.generated.ts", "migrations_*"]
"#;
        let config = CovgateConfig::from_toml(toml).unwrap();
        assert_eq!(config.coverage.threshold, 65.5);
        assert!(!config.coverage.delta_only);
        assert_eq!(
            config.coverage.report.as_deref(),
            Some(Path::new("coverage/coverage-final.json"))
        );
        assert_eq!(config.git.timeout(), Duration::from_secs(5));
        assert_eq!(config.git.base_branch.as_deref(), Some("develop"));
        assert!(!config.enforcer.enabled);
        assert_eq!(config.enforcer.skip_patterns.len(), 2);
    }

    #[test]
    fn empty_toml_gives_defaults() {
        let config = CovgateConfig::from_toml("").unwrap();
        assert_eq!(config.coverage.threshold, 80.0);
        assert_eq!(config.git.timeout_secs, 30);
    }

    #[test]
    fn invalid_toml_returns_error() {
        assert!(CovgateConfig::from_toml("{{invalid}}").is_err());
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let err = CovgateConfig::from_toml("[coverage]\nthreshold = 120.0\n").unwrap_err();
        assert!(matches!(err, CovgateError::Config(_)));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = CovgateConfig::from_toml("[git]\ntimeout_secs = 0\n").unwrap_err();
        assert!(matches!(err, CovgateError::Config(_)));
    }

    #[test]
    fn explicit_path_wins_over_local_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(DEFAULT_CONFIG_FILE), "").unwrap();
        let explicit = dir.path().join("other.toml");
        let located = CovgateConfig::locate(Some(&explicit), dir.path());
        assert_eq!(located, Some(explicit));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = CovgateConfig::load(Some(&missing), dir.path()).unwrap_err();
        assert!(matches!(err, CovgateError::FileNotFound(_)));
    }

    #[test]
    fn local_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(DEFAULT_CONFIG_FILE),
            "[coverage]\nthreshold = 42.0\n",
        )
        .unwrap();
        let config = CovgateConfig::from_file(&dir.path().join(DEFAULT_CONFIG_FILE)).unwrap();
        assert_eq!(config.coverage.threshold, 42.0);
    }
}
