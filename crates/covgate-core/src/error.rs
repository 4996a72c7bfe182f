use std::path::PathBuf;

/// Errors that can occur across covgate.
///
/// Library crates use this type internally and absorb it at their public
/// boundary where the operation is defined to be total (git queries, report
/// loading). The binary surfaces it through `miette`.
///
/// # Examples
///
/// ```
/// use covgate_core::CovgateError;
///
/// let err = CovgateError::Git("exit status 128".into());
/// assert!(err.to_string().contains("exit status 128"));
/// ```
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum CovgateError {
    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    #[diagnostic(code(covgate::io))]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    #[diagnostic(code(covgate::config))]
    Config(String),

    /// A git invocation failed, timed out, or exited non-zero.
    #[error("git error: {0}")]
    #[diagnostic(code(covgate::git))]
    Git(String),

    /// A coverage report or tool output had an unexpected shape.
    #[error("parse error: {0}")]
    #[diagnostic(code(covgate::parse))]
    Parse(String),

    /// JSON serialization / deserialization failure.
    #[error("serialization error: {0}")]
    #[diagnostic(code(covgate::json))]
    Serialization(#[from] serde_json::Error),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    #[diagnostic(code(covgate::toml))]
    Toml(#[from] toml::de::Error),

    /// A required file was not found.
    #[error("file not found: {}", .0.display())]
    #[diagnostic(code(covgate::not_found))]
    FileNotFound(PathBuf),
}
