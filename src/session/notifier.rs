//! Best-effort notification about newer published versions.
//!
//! The check never fails and never blocks the command. A notice recorded by a previous
//! check is shown straight from the cache; a fresh registry query, when one is due, runs
//! as a background tokio task alongside the command. Once the command is done the task
//! gets a short, bounded grace period to land its result in the cache before the
//! runtime shuts down; a query still in flight after that is abandoned.

use crate::api::RegistryClient;
use crate::cli::Toolkit;
use crate::config::UpdateCheckConfig;
use crate::error::UpdateCheckError;
use crate::models::{PackageData, UpdateCache, UpdateInfo};
use crate::session::UpdateCacheStore;
use chrono::Utc;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

/// Slot for a notice that is printed when the process is about to exit.
#[derive(Debug, Clone, Default)]
pub struct DeferredNotice {
    slot: Arc<Mutex<Option<UpdateInfo>>>,
}

impl DeferredNotice {
    fn stash(&self, update: UpdateInfo) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = Some(update);
        }
    }

    /// Takes the pending update, if any.
    pub fn take(&self) -> Option<UpdateInfo> {
        self.slot.lock().ok().and_then(|mut slot| slot.take())
    }

    /// Prints the pending notice to stderr. Called once, at exit.
    pub fn flush(&self, toolkit: &Toolkit, is_global: bool) {
        if let Some(update) = self.take() {
            eprintln!("{}", render_notice(&update, is_global, toolkit));
        }
    }
}

/// Registry query that may still be running when the command finishes.
#[derive(Debug, Default)]
pub struct PendingCheck {
    handle: Option<JoinHandle<()>>,
}

impl PendingCheck {
    pub fn new(handle: Option<JoinHandle<()>>) -> Self {
        Self { handle }
    }

    pub fn is_pending(&self) -> bool {
        self.handle.is_some()
    }

    /// Waits at most `timeout` for the query, then abandons it.
    pub async fn settle(self, timeout: Duration) {
        let Some(mut handle) = self.handle else {
            return;
        };
        match tokio::time::timeout(timeout, &mut handle).await {
            Ok(_) => debug!("Update check settled"),
            Err(_) => {
                debug!("Update check still pending after {:?}; abandoning it", timeout);
                handle.abort();
            },
        }
    }
}

/// Builds the framed upgrade message.
pub fn render_notice(update: &UpdateInfo, is_global: bool, toolkit: &Toolkit) -> String {
    let command = if is_global {
        format!("npm i -g {}", update.name)
    } else {
        format!("npm i {}", update.name)
    };

    toolkit.boxed(&[
        format!(
            "Update available {} → {}",
            toolkit.dim(&update.current),
            toolkit.success(&update.latest)
        ),
        format!("Run {} to update", toolkit.highlight(&command)),
    ])
}

/// Checks the registry for a newer version of one package.
pub struct UpdateNotifier {
    package: PackageData,
    config: UpdateCheckConfig,
    client: RegistryClient,
    store: UpdateCacheStore,
    toolkit: Toolkit,
    deferred: DeferredNotice,
}

impl UpdateNotifier {
    pub fn new(
        package: PackageData,
        config: UpdateCheckConfig,
        client: RegistryClient,
        store: UpdateCacheStore,
        toolkit: Toolkit,
    ) -> Self {
        Self {
            package,
            config,
            client,
            store,
            toolkit,
            deferred: DeferredNotice::default(),
        }
    }

    /// Handle to the exit-time notice slot shared with the background task.
    pub fn deferred(&self) -> DeferredNotice {
        self.deferred.clone()
    }

    /// Runs the synchronous part of the check and, when due, spawns the registry query.
    ///
    /// Must be called from within a tokio runtime.
    pub fn check(&self) -> Option<JoinHandle<()>> {
        let now = Utc::now();

        let cache = match self.store.load() {
            Ok(Some(cache)) => cache,
            Ok(None) => {
                // First run: start the interval now instead of querying immediately.
                debug!("No update cache yet; deferring first check by one interval");
                self.save_quietly(&UpdateCache::fresh(now));
                return None;
            },
            Err(e) => {
                debug!("Discarding unreadable update cache: {}", e);
                self.save_quietly(&UpdateCache::fresh(now));
                return None;
            },
        };

        if let Some(update) = &cache.update {
            if update.still_newer_than(&self.package.version) {
                self.emit(update.clone());
            }
            // A recorded update is shown once per check interval.
            let cleared = UpdateCache {
                update: None,
                ..cache.clone()
            };
            self.save_quietly(&cleared);
        }

        if !cache.is_due(now, self.config.update_check_interval) {
            debug!("Update check not due yet");
            return None;
        }

        let task = BackgroundCheck {
            package: self.package.clone(),
            client: self.client.clone(),
            store: self.store.clone(),
            deferred: self.config.defer.then(|| self.deferred.clone()),
        };
        Some(tokio::spawn(task.run()))
    }

    fn emit(&self, update: UpdateInfo) {
        if self.config.defer {
            self.deferred.stash(update);
        } else {
            eprintln!(
                "{}",
                render_notice(&update, self.config.is_global, &self.toolkit)
            );
        }
    }

    fn save_quietly(&self, cache: &UpdateCache) {
        if let Err(e) = self.store.save(cache) {
            debug!("Could not write update cache: {}", e);
        }
    }
}

/// The part of the check that talks to the network.
struct BackgroundCheck {
    package: PackageData,
    client: RegistryClient,
    store: UpdateCacheStore,
    deferred: Option<DeferredNotice>,
}

impl BackgroundCheck {
    async fn run(self) {
        if let Err(e) = self.query().await {
            debug!("Update check failed: {}", e);
        }
    }

    async fn query(&self) -> Result<(), UpdateCheckError> {
        let latest = self.client.latest_version(&self.package.name).await?;
        let update = UpdateInfo::between(&self.package.name, &self.package.version, &latest)?;

        self.store.save(&UpdateCache {
            last_update_check: Utc::now(),
            update: update.clone(),
        })?;

        if let Some(update) = &update {
            debug!(
                "{} update available for {}: {} -> {}",
                update.kind, update.name, update.current, update.latest
            );
        }
        if let (Some(deferred), Some(update)) = (&self.deferred, update) {
            deferred.stash(update);
        }
        Ok(())
    }
}
