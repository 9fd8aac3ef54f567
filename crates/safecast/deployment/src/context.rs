//! Rollout Context - Control-plane operations available to executors
//!
//! Every mutation an executor performs goes through here so that each one
//! is logged with the environment it touches.

use crate::config::RolloutConfig;
use crate::error::Result;
use crate::health::HealthWaiter;
use chrono::Utc;
use safecast_control::{ControlPlane, CreateEnvironment, EnvironmentUpdate};
use safecast_types::{template_name, SourceLinks, Tier, TierChange};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument};

/// Context provided to rollout executors
pub struct RolloutContext {
    control: Arc<dyn ControlPlane>,
    application: String,
    config: RolloutConfig,
    health: HealthWaiter,
    in_place_health: HealthWaiter,
}

impl RolloutContext {
    pub fn new(
        control: Arc<dyn ControlPlane>,
        application: impl Into<String>,
        config: RolloutConfig,
    ) -> Self {
        let health = HealthWaiter::new(config.poll_interval(), config.health_timeout());
        let in_place_health =
            HealthWaiter::new(config.poll_interval(), config.in_place_timeout());
        Self {
            control,
            application: application.into(),
            config,
            health,
            in_place_health,
        }
    }

    pub fn application(&self) -> &str {
        &self.application
    }

    pub fn config(&self) -> &RolloutConfig {
        &self.config
    }

    pub fn source_links(&self) -> &SourceLinks {
        &self.config.source_links
    }

    pub fn change(&self, old: &Tier, new: &Tier) -> TierChange {
        TierChange::between(old, new, &self.application, self.source_links())
    }

    pub async fn preflight<'a>(&self, tiers: impl IntoIterator<Item = &'a Tier>) -> Result<()> {
        self.health.preflight(self.control.as_ref(), tiers).await
    }

    /// Wait for a newly created environment to report Ok health.
    pub async fn wait_until_healthy(&self, tier: &Tier) -> Result<Duration> {
        self.wait(&self.health, tier).await
    }

    /// Wait for an environment to return to Ok health after a version update.
    pub async fn wait_until_updated(&self, tier: &Tier) -> Result<Duration> {
        self.wait(&self.in_place_health, tier).await
    }

    async fn wait(&self, waiter: &HealthWaiter, tier: &Tier) -> Result<Duration> {
        info!(
            env_name = %tier.name,
            poll_secs = waiter.poll_interval().as_secs(),
            ceiling_secs = waiter.ceiling().as_secs(),
            "Waiting for environment health"
        );
        waiter
            .wait_until_healthy(self.control.as_ref(), &tier.name)
            .await
    }

    #[instrument(skip(self, tier), fields(env_name = %tier.name))]
    pub async fn deploy_version(&self, tier: &Tier, version_label: &str) -> Result<()> {
        self.control
            .update_environment(
                &self.application,
                &tier.name,
                &EnvironmentUpdate::Version {
                    version_label: version_label.to_string(),
                },
            )
            .await?;
        info!(version = version_label, "Version update issued");
        Ok(())
    }

    /// Scale a tier down to nothing so it stops taking work.
    #[instrument(skip(self, tier), fields(env_name = %tier.name))]
    pub async fn scale_to_zero(&self, tier: &Tier) -> Result<()> {
        self.control
            .update_environment(
                &self.application,
                &tier.name,
                &EnvironmentUpdate::ScalingBounds {
                    min_size: 0,
                    max_size: 0,
                },
            )
            .await?;
        info!("Scaling bounds set to zero");
        Ok(())
    }

    /// Launch the environment for a planned tier from its slot template.
    #[instrument(skip(self, tier), fields(env_name = %tier.name, rotation = %tier.rotation))]
    pub async fn create_environment(&self, tier: &Tier) -> Result<()> {
        let request = CreateEnvironment {
            application: self.application.clone(),
            name: tier.name.clone(),
            platform_arn: tier.platform_arn.clone(),
            template_name: template_name(tier.class, tier.kind),
            version_label: tier.version_label.clone(),
        };
        self.control.create_environment(&request).await?;
        info!(
            platform_arn = %request.platform_arn,
            template = %request.template_name,
            version = request.version_label.as_deref().unwrap_or("<none>"),
            "Environment creation issued"
        );
        Ok(())
    }

    pub async fn swap_cnames(&self, old: &Tier, new: &Tier) -> Result<()> {
        self.control
            .swap_environment_cnames(&old.name, &new.name)
            .await?;
        info!(from = %old.name, to = %new.name, "CNAMEs swapped");
        Ok(())
    }

    #[instrument(skip(self, tier), fields(env_name = %tier.name))]
    pub async fn terminate(&self, tier: &Tier) -> Result<()> {
        self.control.terminate_environment(&tier.name).await?;
        info!("Environment termination issued");
        Ok(())
    }

    /// Sleep for a fixed settle period, logging when it will end.
    pub async fn settle(&self, reason: &str, duration: Duration) {
        let wake_at = chrono::Duration::from_std(duration)
            .map(|d| Utc::now() + d)
            .unwrap_or_else(|_| Utc::now());
        info!(
            seconds = duration.as_secs(),
            wake_at = %wake_at.format("%H:%M:%S"),
            "Sleeping: {}", reason
        );
        tokio::time::sleep(duration).await;
    }
}
