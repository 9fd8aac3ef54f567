//! Health gating
//!
//! A freshly created or updated environment reports stale or missing health
//! for a while, so the first poll is delayed by one full interval.

use crate::error::{DeploymentError, Result};
use safecast_control::{ControlPlane, HealthStatus};
use safecast_types::Tier;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Bounded health polling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthWaiter {
    poll_interval: Duration,
    ceiling: Duration,
}

impl HealthWaiter {
    pub fn new(poll_interval: Duration, ceiling: Duration) -> Self {
        Self {
            poll_interval,
            ceiling,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn ceiling(&self) -> Duration {
        self.ceiling
    }

    /// Wait until `name` reports Ok health.
    ///
    /// Returns the time waited. Fails once the cumulative wait reaches the
    /// ceiling without an Ok answer; the environment is left as is.
    pub async fn wait_until_healthy(
        &self,
        control: &dyn ControlPlane,
        name: &str,
    ) -> Result<Duration> {
        let mut waited = Duration::ZERO;

        loop {
            tokio::time::sleep(self.poll_interval).await;
            waited += self.poll_interval;

            let health = control.describe_environment_health(name).await?;
            if health.is_ok() {
                info!(env_name = %name, waited_secs = waited.as_secs(), "Environment healthy");
                return Ok(waited);
            }

            if waited >= self.ceiling {
                warn!(
                    env_name = %name,
                    %health,
                    waited_secs = waited.as_secs(),
                    "Gave up waiting for health"
                );
                return Err(DeploymentError::EnvironmentUpdateTimedOut {
                    name: name.to_string(),
                    waited_secs: waited.as_secs(),
                });
            }

            debug!(env_name = %name, %health, waited_secs = waited.as_secs(), "Not healthy yet");
        }
    }

    /// Refuse to touch a fleet in which any tier is not Ok.
    pub async fn preflight<'a>(
        &self,
        control: &dyn ControlPlane,
        tiers: impl IntoIterator<Item = &'a Tier>,
    ) -> Result<()> {
        for tier in tiers {
            let health = control.describe_environment_health(&tier.name).await?;
            if health != HealthStatus::Ok {
                warn!(env_name = %tier.name, %health, "Preflight health check failed");
                return Err(DeploymentError::EnvironmentNotHealthy {
                    name: tier.name.clone(),
                    health,
                });
            }
            debug!(env_name = %tier.name, "Preflight health Ok");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use safecast_control::InMemoryControlPlane;
    use safecast_types::{EnvironmentClass, Rotation, TierKind};

    fn waiter() -> HealthWaiter {
        HealthWaiter::new(Duration::from_secs(40), Duration::from_secs(540))
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_poll_is_delayed() {
        let cp = InMemoryControlPlane::new();
        cp.add_environment("api", "safecastapi-dev-022", "arn", None);

        let started = tokio::time::Instant::now();
        let waited = waiter().wait_until_healthy(&cp, "safecastapi-dev-022").await.unwrap();
        assert_eq!(waited, Duration::from_secs(40));
        assert!(started.elapsed() >= Duration::from_secs(40));
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_through_transitional_states() {
        let cp = InMemoryControlPlane::new();
        cp.script_health(
            "safecastapi-dev-022",
            [HealthStatus::Pending, HealthStatus::Warning, HealthStatus::Ok],
        );
        let waited = waiter().wait_until_healthy(&cp, "safecastapi-dev-022").await.unwrap();
        assert_eq!(waited, Duration::from_secs(120));
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_at_ceiling() {
        let cp = InMemoryControlPlane::new();
        cp.script_health("safecastapi-dev-022", [HealthStatus::Severe]);

        let err = waiter()
            .wait_until_healthy(&cp, "safecastapi-dev-022")
            .await
            .unwrap_err();
        match err {
            DeploymentError::EnvironmentUpdateTimedOut { name, waited_secs } => {
                assert_eq!(name, "safecastapi-dev-022");
                assert_eq!(waited_secs, 560);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(cp.calls().len(), 14);
    }

    #[tokio::test]
    async fn test_preflight_rejects_unhealthy_tier() {
        let cp = InMemoryControlPlane::new();
        cp.add_environment("api", "safecastapi-dev-021", "arn", None);
        cp.script_health("safecastapi-dev-wrk-021", [HealthStatus::Degraded]);

        let rotation = Rotation::new(21).unwrap();
        let tiers = [
            Tier::new("api", EnvironmentClass::Development, TierKind::Worker, rotation, "arn"),
            Tier::new("api", EnvironmentClass::Development, TierKind::Web, rotation, "arn"),
        ];
        let err = waiter().preflight(&cp, &tiers).await.unwrap_err();
        assert!(matches!(
            err,
            DeploymentError::EnvironmentNotHealthy { ref name, health: HealthStatus::Degraded }
                if name == "safecastapi-dev-wrk-021"
        ));
    }
}
