//! Package descriptor and the session record derived from it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Brand name shown to the user, independent of the registry package name.
pub const CLI_NAME: &str = "uniweb";

/// One-line summary shown in help output.
pub const CLI_DESCRIPTION: &str = "Manager for sites and modules";

/// The subset of a `package.json` descriptor the CLI cares about.
///
/// Unknown fields are ignored; `peerDependencies` defaults to empty when absent.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageData {
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub peer_dependencies: BTreeMap<String, String>,
}

/// Immutable description of the running CLI session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub name: String,
    pub description: String,
    pub version: String,
    /// Registry name of the distributable, e.g. `uniweb-tools`.
    pub package_name: String,
    pub peer_dependencies: BTreeMap<String, String>,
}

impl SessionInfo {
    /// Builds the session record from a resolved descriptor.
    ///
    /// `name` and `description` are always the CLI-level values; everything else
    /// is carried over from the descriptor untouched.
    pub fn from_package(package: &PackageData) -> Self {
        Self {
            name: CLI_NAME.to_string(),
            description: CLI_DESCRIPTION.to_string(),
            version: package.version.clone(),
            package_name: package.name.clone(),
            peer_dependencies: package.peer_dependencies.clone(),
        }
    }
}
