//! Runtime configuration read from the environment (after `.env` has been loaded).

use crate::error::{AppError, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default registry queried for the latest published version.
pub const DEFAULT_REGISTRY_URL: &str = "https://registry.npmjs.org";

/// Two minutes between registry checks.
pub const DEFAULT_UPDATE_CHECK_INTERVAL: Duration = Duration::from_millis(1000 * 60 * 2);

/// How long a pending registry query may hold up process exit.
pub const DEFAULT_UPDATE_CHECK_GRACE: Duration = Duration::from_millis(1500);

/// Command-line switch that disables the update check for one invocation.
pub const NO_UPDATE_NOTIFIER_FLAG: &str = "--no-update-notifier";

/// Options for the update notifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateCheckConfig {
    /// Minimum time between two registry queries.
    pub update_check_interval: Duration,
    /// Suggest a global install command (`npm i -g`).
    pub is_global: bool,
    /// Show the notice at process exit instead of immediately.
    pub defer: bool,
    /// Upper bound on waiting for an in-flight registry query after the command finished.
    pub settle_timeout: Duration,
}

impl Default for UpdateCheckConfig {
    fn default() -> Self {
        Self {
            update_check_interval: DEFAULT_UPDATE_CHECK_INTERVAL,
            is_global: false,
            defer: true,
            settle_timeout: DEFAULT_UPDATE_CHECK_GRACE,
        }
    }
}

/// Everything the bootstrapper needs besides the argument vector.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Explicit descriptor path; `None` means search next to the executable.
    pub package_json: Option<PathBuf>,
    pub registry_url: String,
    /// Directory for the update cache; `None` means the platform config directory.
    pub cache_dir: Option<PathBuf>,
    pub update_check: UpdateCheckConfig,
    /// `false` when `NO_UPDATE_NOTIFIER` or `CI` is set.
    pub update_notifier_enabled: bool,
}

impl AppConfig {
    /// Builds the configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut update_check = UpdateCheckConfig::default();

        if let Some(raw) = lookup("UNIWEB_UPDATE_CHECK_INTERVAL_MS") {
            let millis: u64 = raw.trim().parse().map_err(|_| {
                AppError::Config(format!(
                    "UNIWEB_UPDATE_CHECK_INTERVAL_MS must be a number of milliseconds, got '{}'",
                    raw
                ))
            })?;
            update_check.update_check_interval = Duration::from_millis(millis);
        }
        if let Some(raw) = lookup("UNIWEB_UPDATE_CHECK_GRACE_MS") {
            let millis: u64 = raw.trim().parse().map_err(|_| {
                AppError::Config(format!(
                    "UNIWEB_UPDATE_CHECK_GRACE_MS must be a number of milliseconds, got '{}'",
                    raw
                ))
            })?;
            update_check.settle_timeout = Duration::from_millis(millis);
        }
        if let Some(raw) = lookup("UNIWEB_UPDATE_GLOBAL") {
            update_check.is_global = parse_bool("UNIWEB_UPDATE_GLOBAL", &raw)?;
        }
        if let Some(raw) = lookup("UNIWEB_UPDATE_DEFER") {
            update_check.defer = parse_bool("UNIWEB_UPDATE_DEFER", &raw)?;
        }

        let registry_url = lookup("UNIWEB_REGISTRY_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_REGISTRY_URL.to_string());

        let update_notifier_enabled =
            lookup("NO_UPDATE_NOTIFIER").is_none() && lookup("CI").is_none();

        Ok(Self {
            package_json: lookup("UNIWEB_PACKAGE_JSON")
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
            registry_url,
            cache_dir: lookup("UNIWEB_CACHE_DIR")
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
            update_check,
            update_notifier_enabled,
        })
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(AppError::Config(format!(
            "{} must be a boolean, got '{}'",
            key, raw
        ))),
    }
}

/// Removes the opt-out switch from the argument vector.
///
/// Arguments after a `--` terminator are passed through untouched. Returns the
/// remaining arguments and whether the switch was present.
pub fn strip_opt_out_flag(args: Vec<String>) -> (Vec<String>, bool) {
    let mut found = false;
    let mut terminated = false;
    let mut remaining = Vec::with_capacity(args.len());

    for arg in args {
        if !terminated && arg == NO_UPDATE_NOTIFIER_FLAG {
            found = true;
            continue;
        }
        if arg == "--" {
            terminated = true;
        }
        remaining.push(arg);
    }
    (remaining, found)
}
