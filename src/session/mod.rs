//! Session bootstrap: who am I, and is there a newer me?
//!
//! Resolves the package descriptor, derives the `SessionInfo` record handed to
//! command handlers, and starts the update notifier.

mod cache;
mod metadata;
mod notifier;

pub use cache::*;
pub use metadata::*;
pub use notifier::*;

use crate::api::RegistryClient;
use crate::cli::Toolkit;
use crate::config::{AppConfig, UpdateCheckConfig};
use crate::error::Result;
use crate::models::{PackageData, SessionInfo};
use tracing::{debug, info};

/// Output of a successful bootstrap.
#[derive(Debug)]
pub struct Session {
    pub info: SessionInfo,
    pub package: PackageData,
    /// Notice to print at exit, filled in by the update check when deferring.
    pub notices: DeferredNotice,
    /// Registry query started by this invocation, if one was due.
    pub pending: PendingCheck,
}

/// Builds a `Session` from configuration and a metadata source.
pub struct Bootstrapper<'a> {
    config: &'a AppConfig,
    toolkit: Toolkit,
}

impl<'a> Bootstrapper<'a> {
    pub fn new(config: &'a AppConfig, toolkit: Toolkit) -> Self {
        Self { config, toolkit }
    }

    /// Resolves metadata, builds the session record and kicks off the update check.
    ///
    /// Only metadata resolution can fail. `notify` is `false` when the user opted out
    /// on the command line.
    pub fn start(&self, provider: &dyn MetadataProvider, notify: bool) -> Result<Session> {
        let package = resolve_package_metadata(provider)?;
        let info = build_session_info(&package);
        info!("Starting {} {} ({})", info.name, info.version, info.package_name);

        let (notices, pending) = if notify && self.config.update_notifier_enabled {
            check_for_updates(
                &package,
                self.config.update_check.clone(),
                &self.config.registry_url,
                self.config.cache_dir.as_deref(),
                self.toolkit.clone(),
            )
        } else {
            debug!("Update notifier disabled for this invocation");
            (DeferredNotice::default(), PendingCheck::default())
        };

        Ok(Session {
            info,
            package,
            notices,
            pending,
        })
    }
}

pub fn resolve_package_metadata(provider: &dyn MetadataProvider) -> Result<PackageData> {
    provider.package_data()
}

pub fn build_session_info(package: &PackageData) -> SessionInfo {
    SessionInfo::from_package(package)
}

/// Starts the update check and returns the exit-time notice slot together with the
/// registry query it started, if any.
///
/// Never fails: a missing cache location just means no check this time. The query
/// runs without being awaited; the caller gives it a bounded grace period once the
/// command is done (see [`PendingCheck::settle`]).
pub fn check_for_updates(
    package: &PackageData,
    config: UpdateCheckConfig,
    registry_url: &str,
    cache_dir: Option<&std::path::Path>,
    toolkit: Toolkit,
) -> (DeferredNotice, PendingCheck) {
    let store = match UpdateCacheStore::for_package(&package.name, cache_dir) {
        Ok(store) => store,
        Err(e) => {
            debug!("Skipping update check: {}", e);
            return (DeferredNotice::default(), PendingCheck::default());
        },
    };

    let notifier = UpdateNotifier::new(
        package.clone(),
        config,
        RegistryClient::with_base_url(registry_url),
        store,
        toolkit,
    );
    let pending = PendingCheck::new(notifier.check());
    (notifier.deferred(), pending)
}
