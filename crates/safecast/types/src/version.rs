//! Application version labels
//!
//! CI publishes versions as `<app>-<label>-<build>` or
//! `<app>-<label>-<build>-<commit>`, where `<commit>` is a full 40-character
//! lowercase hex hash. The commit form is tried first so that a label ending
//! in digits is never mistaken for a build number.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::LazyLock;
use thiserror::Error;

static WITH_COMMIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<app>[^-]+)-(?P<label>.+)-(?P<build>\d+)-(?P<commit>[0-9a-f]{40})$")
        .expect("version pattern is valid")
});

static WITHOUT_COMMIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<app>[^-]+)-(?P<label>.+)-(?P<build>\d+)$").expect("version pattern is valid")
});

/// Version label parsing errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    #[error("unparseable version label: {0}")]
    Unparseable(String),
}

/// A version label decomposed into its parts.
///
/// Identity is the full label; the parts are derived from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedVersion {
    pub app: String,
    pub branch_label: String,
    pub build_number: u64,
    pub git_commit: Option<String>,
    pub version: String,
}

impl ParsedVersion {
    pub fn parse(version: &str) -> Result<Self, VersionError> {
        let (captures, has_commit) = match WITH_COMMIT.captures(version) {
            Some(captures) => (captures, true),
            None => (
                WITHOUT_COMMIT
                    .captures(version)
                    .ok_or_else(|| VersionError::Unparseable(version.to_string()))?,
                false,
            ),
        };

        let build_number = captures["build"]
            .parse::<u64>()
            .map_err(|_| VersionError::Unparseable(version.to_string()))?;

        Ok(Self {
            app: captures["app"].to_string(),
            branch_label: captures["label"].to_string(),
            build_number,
            git_commit: has_commit.then(|| captures["commit"].to_string()),
            version: version.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.version
    }
}

impl PartialEq for ParsedVersion {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version
    }
}

impl Eq for ParsedVersion {}

impl Hash for ParsedVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.version.hash(state);
    }
}

impl fmt::Display for ParsedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.version)
    }
}
