//! On-disk state of the update notifier.
//!
//! One small JSON file per package, stored under the user's configuration directory.
//! Writes go to a uniquely named sibling temp file first and are renamed into place,
//! so neither a killed process nor two concurrent ones leave a truncated cache behind.

use crate::error::UpdateCheckError;
use crate::models::UpdateCache;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

const CACHE_DIR_NAME: &str = "uniweb";

/// Handle to the cache file of one package.
#[derive(Debug, Clone)]
pub struct UpdateCacheStore {
    path: PathBuf,
}

impl UpdateCacheStore {
    /// Cache for `package` inside `dir`, or inside the platform config directory when `dir` is `None`.
    pub fn for_package(package: &str, dir: Option<&Path>) -> Result<Self, UpdateCheckError> {
        let dir = match dir {
            Some(dir) => dir.to_path_buf(),
            None => dirs::config_dir()
                .ok_or(UpdateCheckError::NoConfigDir)?
                .join(CACHE_DIR_NAME),
        };
        Ok(Self::at(dir.join(file_name_for(package))))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the cache; `Ok(None)` when it does not exist yet.
    pub fn load(&self) -> Result<Option<UpdateCache>, UpdateCheckError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self, cache: &UpdateCache) -> Result<(), UpdateCheckError> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)?;

        // Each writer gets its own temp file; concurrent invocations race only on the rename.
        let mut tmp = NamedTempFile::new_in(parent)?;
        tmp.write_all(&serde_json::to_vec_pretty(cache)?)?;
        tmp.persist(&self.path).map_err(|e| e.error)?;

        debug!("Wrote update cache {}", self.path.display());
        Ok(())
    }
}

/// `@scope/name` becomes `update-notifier-scope-name.json`.
fn file_name_for(package: &str) -> String {
    let flat = package.trim_start_matches('@').replace('/', "-");
    format!("update-notifier-{}.json", flat)
}
