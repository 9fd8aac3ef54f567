//! Rollout configuration

use crate::error::{DeploymentError, Result};
use safecast_types::SourceLinks;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timing of health waits and settle periods
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolloutConfig {
    /// Seconds between health polls; the first poll also waits this long
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Total seconds a new environment may take to report Ok health
    #[serde(default = "default_health_timeout")]
    pub health_timeout_secs: u64,

    /// Total seconds an updated environment may take to return to Ok health
    #[serde(default = "default_in_place_timeout")]
    pub in_place_timeout_secs: u64,

    /// Seconds to let a scaled-down worker finish its queue
    #[serde(default = "default_worker_drain")]
    pub worker_drain_secs: u64,

    /// Seconds between a CNAME swap and terminating the old web tier
    #[serde(default = "default_cname_settle")]
    pub cname_settle_secs: u64,

    /// Seconds between deleting and recreating a configuration template
    #[serde(default = "default_template_settle")]
    pub template_settle_secs: u64,

    /// Source repositories used for commit comparison links
    #[serde(default)]
    pub source_links: SourceLinks,
}

impl Default for RolloutConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            health_timeout_secs: default_health_timeout(),
            in_place_timeout_secs: default_in_place_timeout(),
            worker_drain_secs: default_worker_drain(),
            cname_settle_secs: default_cname_settle(),
            template_settle_secs: default_template_settle(),
            source_links: SourceLinks::default(),
        }
    }
}

impl RolloutConfig {
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_secs == 0 {
            return Err(DeploymentError::InvalidConfig(
                "poll_interval_secs must be greater than zero".into(),
            ));
        }
        for (field, secs) in [
            ("health_timeout_secs", self.health_timeout_secs),
            ("in_place_timeout_secs", self.in_place_timeout_secs),
        ] {
            if secs < self.poll_interval_secs {
                return Err(DeploymentError::InvalidConfig(format!(
                    "{field} ({secs}) is shorter than poll_interval_secs ({})",
                    self.poll_interval_secs
                )));
            }
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn health_timeout(&self) -> Duration {
        Duration::from_secs(self.health_timeout_secs)
    }

    pub fn in_place_timeout(&self) -> Duration {
        Duration::from_secs(self.in_place_timeout_secs)
    }

    pub fn worker_drain(&self) -> Duration {
        Duration::from_secs(self.worker_drain_secs)
    }

    pub fn cname_settle(&self) -> Duration {
        Duration::from_secs(self.cname_settle_secs)
    }

    pub fn template_settle(&self) -> Duration {
        Duration::from_secs(self.template_settle_secs)
    }
}

fn default_poll_interval() -> u64 {
    40
}

fn default_health_timeout() -> u64 {
    540
}

fn default_in_place_timeout() -> u64 {
    480
}

fn default_worker_drain() -> u64 {
    480
}

fn default_cname_settle() -> u64 {
    120
}

fn default_template_settle() -> u64 {
    5
}
