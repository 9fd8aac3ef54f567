//! Rollout executor trait

use crate::context::RolloutContext;
use crate::error::{DeploymentError, Result};
use async_trait::async_trait;
use safecast_types::{DeploymentRecord, EnvironmentClass, Tier, TopologySnapshot};
use std::fmt;
use tracing::info;

/// Trait for rollout strategy executors
#[async_trait]
pub trait RolloutExecutor: Send + Sync {
    /// Drive one environment class from `observed` to `planned`.
    ///
    /// Tiers are processed worker first. Any failure stops the rollout
    /// where it is; nothing already done is undone.
    async fn execute(
        &self,
        class: EnvironmentClass,
        observed: &TopologySnapshot,
        planned: &TopologySnapshot,
        ctx: &RolloutContext,
    ) -> Result<DeploymentRecord>;

    /// Strategy name for logging
    fn name(&self) -> &str;
}

/// Move a state machine to its next phase.
pub(crate) fn advance<P: fmt::Display + Copy>(strategy: &str, phase: &mut P, next: P) {
    info!(strategy, from = %phase, to = %next, "Phase transition");
    *phase = next;
}

/// Planned tiers of a class in rollout order, each with the tier it replaces.
pub(crate) fn tier_pairs<'a>(
    class: EnvironmentClass,
    observed: &'a TopologySnapshot,
    planned: &'a TopologySnapshot,
) -> Result<Vec<(&'a Tier, &'a Tier)>> {
    planned
        .rollout_tiers(class)
        .map(|new| {
            observed
                .tier(class, new.kind)
                .map(|old| (old, new))
                .ok_or(DeploymentError::MissingTier {
                    class,
                    kind: new.kind,
                })
        })
        .collect()
}
