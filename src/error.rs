//! Defines the application's primary error type `AppError` and a convenience `Result` alias.
//!
//! Uses the `thiserror` crate for ergonomic error definition. Every variant here is fatal:
//! it travels up to `main`, which prints it once and exits with status 1.
//! Failures of the update check have their own type, `UpdateCheckError`, which is
//! deliberately not convertible into `AppError`.
//! Errors that do not implement `Clone` are wrapped in `Arc` to allow `AppError` to be cloneable.

use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// The primary error enumeration for all fatal application errors.
#[derive(Error, Debug, Clone)]
pub enum AppError {
    /// The running package's own descriptor could not be located, read or parsed.
    #[error("{reason}")]
    MetadataUnavailable {
        /// Where the descriptor was looked for, if a location was known.
        path: Option<PathBuf>,
        reason: String,
    },

    /// The command handler failed while populating the parser.
    #[error("Command registration failed: {0}")]
    Registration(Arc<anyhow::Error>),

    /// A matched subcommand failed during execution.
    #[error("{0}")]
    Dispatch(Arc<anyhow::Error>),

    /// An environment setting could not be interpreted.
    #[error("Configuration Error: {0}")]
    Config(String),
}

impl AppError {
    pub(crate) fn metadata(path: Option<PathBuf>, reason: impl Into<String>) -> Self {
        AppError::MetadataUnavailable {
            path,
            reason: reason.into(),
        }
    }
}

/// A specialized `Result` type using the application's `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Errors raised inside the update-notification path.
///
/// These are logged at `debug` level and dropped at the notifier boundary.
#[derive(Error, Debug)]
pub enum UpdateCheckError {
    /// Error originating from the registry client (`reqwest`).
    #[error("Registry Error: {0}")]
    Registry(#[from] reqwest::Error),

    /// The registry answered, but not with a usable version.
    #[error("Unexpected registry response: {0}")]
    Response(String),

    /// The version string could not be parsed as semver.
    #[error("Invalid version: {0}")]
    Version(#[from] semver::Error),

    /// Error reading or writing the cache file.
    #[error("Cache I/O Error: {0}")]
    Io(#[from] std::io::Error),

    /// Error (de)serializing the cache file.
    #[error("Cache Format Error: {0}")]
    Format(#[from] serde_json::Error),

    /// No per-user configuration directory exists on this platform.
    #[error("No configuration directory available for the update cache")]
    NoConfigDir,
}
