//! Structures for the update check: the registry response, the on-disk cache
//! and the resulting update description.

use chrono::{DateTime, Utc};
use semver::Version;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Response of `GET <registry>/<package>/latest`. Only `version` is used.
#[derive(Debug, Deserialize, Clone)]
pub struct RegistryLatest {
    pub version: String,
}

/// How far apart the running and the published version are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateKind {
    Major,
    Minor,
    Patch,
    Prerelease,
}

impl fmt::Display for UpdateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UpdateKind::Major => "major",
            UpdateKind::Minor => "minor",
            UpdateKind::Patch => "patch",
            UpdateKind::Prerelease => "prerelease",
        };
        f.write_str(s)
    }
}

/// A newer published version of the running package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateInfo {
    pub name: String,
    pub current: String,
    pub latest: String,
    #[serde(rename = "type")]
    pub kind: UpdateKind,
}

impl UpdateInfo {
    /// Compares `current` against `latest` and returns an update only when
    /// `latest` is strictly newer.
    pub fn between(name: &str, current: &str, latest: &str) -> Result<Option<Self>, semver::Error> {
        let current_v = Version::parse(current)?;
        let latest_v = Version::parse(latest)?;

        if latest_v <= current_v {
            return Ok(None);
        }

        let kind = if latest_v.major != current_v.major {
            UpdateKind::Major
        } else if latest_v.minor != current_v.minor {
            UpdateKind::Minor
        } else if latest_v.patch != current_v.patch {
            UpdateKind::Patch
        } else {
            UpdateKind::Prerelease
        };

        Ok(Some(Self {
            name: name.to_string(),
            current: current.to_string(),
            latest: latest.to_string(),
            kind,
        }))
    }

    /// Re-evaluates a cached update against the version that is running now.
    ///
    /// A cache written by an older install may advertise a version the user
    /// has since upgraded to.
    pub fn still_newer_than(&self, running: &str) -> bool {
        match (Version::parse(running), Version::parse(&self.latest)) {
            (Ok(running), Ok(latest)) => latest > running,
            _ => false,
        }
    }
}

/// Persisted state of the update notifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCache {
    /// Epoch milliseconds of the last registry query (or of cache creation).
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_update_check: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update: Option<UpdateInfo>,
}

impl UpdateCache {
    pub fn fresh(now: DateTime<Utc>) -> Self {
        Self {
            last_update_check: now,
            update: None,
        }
    }

    /// Whether at least `interval` has passed since the last check.
    pub fn is_due(&self, now: DateTime<Utc>, interval: std::time::Duration) -> bool {
        let elapsed = now.signed_duration_since(self.last_update_check);
        match elapsed.to_std() {
            Ok(elapsed) => elapsed >= interval,
            // Clock moved backwards; treat as due rather than never checking again.
            Err(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rstest::rstest;

    #[rstest]
    #[case("1.0.0", "2.0.0", Some(UpdateKind::Major))]
    #[case("1.0.0", "1.1.0", Some(UpdateKind::Minor))]
    #[case("1.0.0", "1.0.1", Some(UpdateKind::Patch))]
    #[case("1.0.0-beta.1", "1.0.0-beta.2", Some(UpdateKind::Prerelease))]
    #[case("1.0.0", "1.0.0", None)]
    #[case("2.0.0", "1.9.9", None)]
    fn classifies_updates(
        #[case] current: &str,
        #[case] latest: &str,
        #[case] expected: Option<UpdateKind>,
    ) {
        let update = UpdateInfo::between("uniweb-tools", current, latest).unwrap();
        assert_eq!(update.map(|u| u.kind), expected);
    }

    #[test]
    fn rejects_non_semver_versions() {
        assert!(UpdateInfo::between("x", "latest", "1.0.0").is_err());
    }

    #[test]
    fn cached_update_is_dropped_after_upgrade() {
        let update = UpdateInfo::between("x", "1.0.0", "1.2.0").unwrap().unwrap();
        assert!(update.still_newer_than("1.1.0"));
        assert!(!update.still_newer_than("1.2.0"));
        assert!(!update.still_newer_than("not-a-version"));
    }

    #[test]
    fn cache_due_after_interval() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let cache = UpdateCache::fresh(start);
        let interval = std::time::Duration::from_secs(120);

        assert!(!cache.is_due(start + Duration::seconds(119), interval));
        assert!(cache.is_due(start + Duration::seconds(120), interval));
        assert!(cache.is_due(start - Duration::seconds(5), interval));
    }

    #[test]
    fn cache_uses_epoch_millis_on_disk() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let json = serde_json::to_value(UpdateCache::fresh(start)).unwrap();
        assert_eq!(json["lastUpdateCheck"], start.timestamp_millis());
        assert!(json.get("update").is_none());
    }
}
