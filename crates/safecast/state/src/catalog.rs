//! Version catalog

use crate::error::{Result, StateError};
use safecast_control::{ApplicationVersion, VersionStatus};
use serde::{Deserialize, Serialize};

/// Application versions split by whether they can be deployed.
///
/// Both lists are ordered oldest to newest by the control plane's update
/// timestamp.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionCatalog {
    pub available: Vec<ApplicationVersion>,
    pub failed: Vec<ApplicationVersion>,
}

impl VersionCatalog {
    pub fn classify(mut versions: Vec<ApplicationVersion>) -> Self {
        versions.sort_by_key(|v| v.updated_at);
        let (failed, available) = versions
            .into_iter()
            .partition(|v| v.status == VersionStatus::Failed);

        Self { available, failed }
    }

    /// Check that a version may be deployed.
    ///
    /// The failed list wins over the available list.
    pub fn validate(&self, version: &str) -> Result<()> {
        if self.failed.iter().any(|v| v.version_label == version) {
            return Err(StateError::VersionFailed(version.to_string()));
        }
        if !self.available.iter().any(|v| v.version_label == version) {
            return Err(StateError::VersionNotFound(version.to_string()));
        }
        Ok(())
    }

    pub fn available_labels(&self) -> impl Iterator<Item = &str> {
        self.available.iter().map(|v| v.version_label.as_str())
    }

    pub fn failed_labels(&self) -> impl Iterator<Item = &str> {
        self.failed.iter().map(|v| v.version_label.as_str())
    }

    pub fn latest(&self) -> Option<&ApplicationVersion> {
        self.available.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn version(label: &str, minutes: i64, status: VersionStatus) -> ApplicationVersion {
        let base = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        ApplicationVersion {
            version_label: label.to_string(),
            updated_at: base + Duration::minutes(minutes),
            status,
        }
    }

    #[test]
    fn test_classify_orders_oldest_first() {
        let catalog = VersionCatalog::classify(vec![
            version("api-main-3", 30, VersionStatus::Processed),
            version("api-main-1", 10, VersionStatus::Processed),
            version("api-main-2", 20, VersionStatus::Failed),
            version("api-main-0", 0, VersionStatus::Unprocessed),
        ]);

        let available: Vec<_> = catalog.available_labels().collect();
        assert_eq!(available, vec!["api-main-0", "api-main-1", "api-main-3"]);
        let failed: Vec<_> = catalog.failed_labels().collect();
        assert_eq!(failed, vec!["api-main-2"]);
        assert_eq!(catalog.latest().unwrap().version_label, "api-main-3");
    }

    #[test]
    fn test_validate_unknown_version() {
        let catalog = VersionCatalog::classify(vec![version(
            "api-main-1",
            0,
            VersionStatus::Processed,
        )]);
        assert!(catalog.validate("api-main-1").is_ok());
        assert!(matches!(
            catalog.validate("api-main-9"),
            Err(StateError::VersionNotFound(v)) if v == "api-main-9"
        ));
    }

    #[test]
    fn test_failed_takes_precedence() {
        let catalog = VersionCatalog {
            available: vec![version("api-main-2", 0, VersionStatus::Processed)],
            failed: vec![version("api-main-2", 5, VersionStatus::Failed)],
        };
        assert!(matches!(
            catalog.validate("api-main-2"),
            Err(StateError::VersionFailed(_))
        ));
    }
}
