//! Core types, configuration, and error handling for covgate.
//!
//! This crate provides the shared foundation used by the other covgate crates:
//! - [`CovgateError`]: unified error type using `thiserror`
//! - [`CovgateConfig`]: configuration loaded from `.covgate.toml`
//! - Shared types: [`OutputFormat`], [`Verdict`]

mod config;
mod error;
mod types;

pub use config::{
    CoverageConfig, CovgateConfig, EnforcerConfig, GitConfig, CONFIG_ENV_VAR,
    DEFAULT_CONFIG_FILE,
};
pub use error::CovgateError;
pub use types::{OutputFormat, Verdict};

/// A convenience `Result` type for covgate operations.
pub type Result<T> = std::result::Result<T, CovgateError>;
