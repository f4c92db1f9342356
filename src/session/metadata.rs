//! Resolves the running package's own descriptor (`package.json`).

use crate::error::{AppError, Result};
use crate::models::PackageData;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

const DESCRIPTOR_FILE: &str = "package.json";

/// Source of the running package's identity.
pub trait MetadataProvider {
    /// Returns the descriptor, or `AppError::MetadataUnavailable`.
    fn package_data(&self) -> Result<PackageData>;
}

/// Reads `package.json` from disk.
#[derive(Debug, Clone)]
pub struct PackageJsonProvider {
    explicit: Option<PathBuf>,
}

impl PackageJsonProvider {
    /// Reads exactly the given file.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            explicit: Some(path.into()),
        }
    }

    /// Searches next to the executable and then upwards through its ancestors,
    /// the way an installed `bin/` entry point finds `../package.json`.
    pub fn near_executable() -> Self {
        Self { explicit: None }
    }

    pub fn from_path_override(path: Option<&Path>) -> Self {
        match path {
            Some(path) => Self::at(path),
            None => Self::near_executable(),
        }
    }

    fn locate(&self) -> Result<PathBuf> {
        if let Some(path) = &self.explicit {
            return Ok(path.clone());
        }

        let exe = std::env::current_exe().map_err(|e| {
            AppError::metadata(None, format!("cannot determine executable location: {}", e))
        })?;
        let exe = exe.canonicalize().unwrap_or(exe);

        find_descriptor(&exe).ok_or_else(|| {
            AppError::metadata(
                None,
                format!(
                    "ENOENT: no {} found alongside {} or in any parent directory",
                    DESCRIPTOR_FILE,
                    exe.display()
                ),
            )
        })
    }
}

impl MetadataProvider for PackageJsonProvider {
    fn package_data(&self) -> Result<PackageData> {
        let path = self.locate()?;
        debug!("Reading package descriptor from {}", path.display());
        read_descriptor(&path)
    }
}

/// Walks from `start`'s directory to the filesystem root looking for a descriptor.
fn find_descriptor(start: &Path) -> Option<PathBuf> {
    let dir = if start.is_dir() { start } else { start.parent()? };
    dir.ancestors()
        .map(|ancestor| ancestor.join(DESCRIPTOR_FILE))
        .find(|candidate| candidate.is_file())
}

fn read_descriptor(path: &Path) -> Result<PackageData> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        let reason = match e.kind() {
            ErrorKind::NotFound => format!(
                "ENOENT: no such file or directory, open '{}'",
                path.display()
            ),
            _ => format!("cannot read '{}': {}", path.display(), e),
        };
        AppError::metadata(Some(path.to_path_buf()), reason)
    })?;

    serde_json::from_str(&raw).map_err(|e| {
        AppError::metadata(
            Some(path.to_path_buf()),
            format!("invalid package descriptor '{}': {}", path.display(), e),
        )
    })
}
