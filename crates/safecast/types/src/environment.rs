//! Environment classes and tier kinds
//!
//! Both are closed sets. Every environment class has exactly one web tier
//! and at most one worker tier.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Deployment slot class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EnvironmentClass {
    #[serde(rename = "dev")]
    Development,
    #[serde(rename = "prd")]
    Production,
}

impl EnvironmentClass {
    pub const ALL: [EnvironmentClass; 2] =
        [EnvironmentClass::Development, EnvironmentClass::Production];

    /// Short code used in environment and template names
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvironmentClass::Development => "dev",
            EnvironmentClass::Production => "prd",
        }
    }
}

impl fmt::Display for EnvironmentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EnvironmentClass {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dev" => Ok(EnvironmentClass::Development),
            "prd" => Ok(EnvironmentClass::Production),
            other => Err(ParseEnumError {
                kind: "environment class",
                value: other.to_string(),
            }),
        }
    }
}

/// Role of a tier within an environment class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TierKind {
    /// Request-serving tier, reachable through the environment CNAME
    #[serde(rename = "web")]
    Web,
    /// Background worker tier
    #[serde(rename = "wrk")]
    Worker,
}

impl TierKind {
    pub const ALL: [TierKind; 2] = [TierKind::Web, TierKind::Worker];

    /// Order in which tiers are rolled out.
    ///
    /// Workers run migrations on start-up, so they always go first.
    pub const ROLLOUT_ORDER: [TierKind; 2] = [TierKind::Worker, TierKind::Web];

    pub fn as_str(&self) -> &'static str {
        match self {
            TierKind::Web => "web",
            TierKind::Worker => "wrk",
        }
    }
}

impl fmt::Display for TierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TierKind {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "web" => Ok(TierKind::Web),
            "wrk" => Ok(TierKind::Worker),
            other => Err(ParseEnumError {
                kind: "tier kind",
                value: other.to_string(),
            }),
        }
    }
}

/// Error returned when a short code names no known variant
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}
