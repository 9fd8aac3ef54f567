//! In-place update strategy

use super::executor::{advance, tier_pairs, RolloutExecutor};
use crate::context::RolloutContext;
use crate::error::{DeploymentError, Result};
use async_trait::async_trait;
use safecast_types::{
    DeploymentEvent, DeploymentRecord, EnvironmentClass, TierKind, TopologySnapshot,
};
use std::fmt;
use tracing::{info, instrument};

/// States of an in-place update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameEnvPhase {
    Idle,
    Preflight,
    UpdatingWorker,
    WaitingWorkerHealthy,
    UpdatingWeb,
    WaitingWebHealthy,
    Done,
}

impl SameEnvPhase {
    fn updating(kind: TierKind) -> Self {
        match kind {
            TierKind::Worker => SameEnvPhase::UpdatingWorker,
            TierKind::Web => SameEnvPhase::UpdatingWeb,
        }
    }

    fn waiting(kind: TierKind) -> Self {
        match kind {
            TierKind::Worker => SameEnvPhase::WaitingWorkerHealthy,
            TierKind::Web => SameEnvPhase::WaitingWebHealthy,
        }
    }
}

impl fmt::Display for SameEnvPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Deploys a new version onto the running environments
///
/// Every tier must report Ok health before anything is touched.
#[derive(Debug, Default)]
pub struct InPlaceUpdateExecutor;

impl InPlaceUpdateExecutor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RolloutExecutor for InPlaceUpdateExecutor {
    #[instrument(skip_all, fields(application = %ctx.application(), class = %class))]
    async fn execute(
        &self,
        class: EnvironmentClass,
        observed: &TopologySnapshot,
        planned: &TopologySnapshot,
        ctx: &RolloutContext,
    ) -> Result<DeploymentRecord> {
        let mut phase = SameEnvPhase::Idle;
        let pairs = tier_pairs(class, observed, planned)?;

        info!(tiers = pairs.len(), "Starting in-place update");

        advance(self.name(), &mut phase, SameEnvPhase::Preflight);
        ctx.preflight(observed.rollout_tiers(class)).await?;

        let mut record =
            DeploymentRecord::started(ctx.application(), class, DeploymentEvent::SameEnvironment);

        for (old, new) in pairs {
            let version = new
                .version_label
                .as_deref()
                .ok_or_else(|| DeploymentError::MissingVersion {
                    name: new.name.clone(),
                })?;

            advance(self.name(), &mut phase, SameEnvPhase::updating(new.kind));
            ctx.deploy_version(old, version).await?;

            advance(self.name(), &mut phase, SameEnvPhase::waiting(new.kind));
            ctx.wait_until_updated(new).await?;

            record.set_tier(new.kind, ctx.change(old, new));
        }

        advance(self.name(), &mut phase, SameEnvPhase::Done);
        let record = record.complete();
        info!(elapsed_secs = record.elapsed_time, "In-place update completed");

        Ok(record)
    }

    fn name(&self) -> &str {
        "same-env"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RolloutConfig;
    use safecast_control::{ControlPlaneCall, EnvironmentUpdate, HealthStatus, InMemoryControlPlane};
    use safecast_types::{Rotation, Tier};
    use std::sync::Arc;

    const NEW: &str = "api-main-101-bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";

    fn snapshot(version: &str, with_worker: bool) -> TopologySnapshot {
        let rotation = Rotation::new(21).unwrap();
        let mut snapshot = TopologySnapshot::new("api");
        let kinds: &[TierKind] = if with_worker {
            &[TierKind::Web, TierKind::Worker]
        } else {
            &[TierKind::Web]
        };
        for kind in kinds {
            snapshot
                .insert(
                    Tier::new("api", EnvironmentClass::Development, *kind, rotation, "arn")
                        .with_resource_id("e-1")
                        .with_version_label(version),
                )
                .unwrap();
        }
        snapshot
    }

    #[tokio::test(start_paused = true)]
    async fn test_worker_updated_before_web() {
        let cp = Arc::new(InMemoryControlPlane::new());
        cp.add_environment("api", "safecastapi-dev-021", "arn", Some("api-main-100"));
        cp.add_environment("api", "safecastapi-dev-wrk-021", "arn", Some("api-main-100"));
        let ctx = RolloutContext::new(cp.clone(), "api", RolloutConfig::default());

        let record = InPlaceUpdateExecutor::new()
            .execute(
                EnvironmentClass::Development,
                &snapshot("api-main-100", true),
                &snapshot(NEW, true),
                &ctx,
            )
            .await
            .unwrap();

        let updated: Vec<_> = cp
            .mutations()
            .into_iter()
            .filter_map(|call| match call {
                ControlPlaneCall::UpdateEnvironment { name, update, .. } => Some((name, update)),
                _ => None,
            })
            .collect();
        let version = EnvironmentUpdate::Version {
            version_label: NEW.into(),
        };
        assert_eq!(
            updated,
            vec![
                ("safecastapi-dev-wrk-021".to_string(), version.clone()),
                ("safecastapi-dev-021".to_string(), version),
            ]
        );
        assert!(record.web.is_some() && record.wrk.is_some());
        assert!(record.web.unwrap().github_diff.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unhealthy_fleet_is_untouched() {
        let cp = Arc::new(InMemoryControlPlane::new());
        cp.script_health("safecastapi-dev-021", [HealthStatus::Warning]);
        cp.script_health("safecastapi-dev-wrk-021", [HealthStatus::Ok]);
        let ctx = RolloutContext::new(cp.clone(), "api", RolloutConfig::default());

        let err = InPlaceUpdateExecutor::new()
            .execute(
                EnvironmentClass::Development,
                &snapshot("api-main-100", true),
                &snapshot(NEW, true),
                &ctx,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DeploymentError::EnvironmentNotHealthy { .. }));
        assert!(cp.mutations().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_wait_uses_in_place_ceiling() {
        let cp = Arc::new(InMemoryControlPlane::new());
        cp.add_environment("api", "safecastapi-dev-021", "arn", Some("api-main-100"));
        cp.script_health(
            "safecastapi-dev-021",
            [HealthStatus::Ok, HealthStatus::Degraded],
        );
        let ctx = RolloutContext::new(cp.clone(), "api", RolloutConfig::default());

        let err = InPlaceUpdateExecutor::new()
            .execute(
                EnvironmentClass::Development,
                &snapshot("api-main-100", false),
                &snapshot(NEW, false),
                &ctx,
            )
            .await
            .unwrap_err();

        match err {
            DeploymentError::EnvironmentUpdateTimedOut { name, waited_secs } => {
                assert_eq!(name, "safecastapi-dev-021");
                assert_eq!(waited_secs, 480);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_planned_tier_without_observed_tier() {
        let cp = Arc::new(InMemoryControlPlane::new());
        let ctx = RolloutContext::new(cp.clone(), "api", RolloutConfig::default());

        let err = InPlaceUpdateExecutor::new()
            .execute(
                EnvironmentClass::Development,
                &snapshot("api-main-100", false),
                &snapshot(NEW, true),
                &ctx,
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DeploymentError::MissingTier {
                kind: TierKind::Worker,
                ..
            }
        ));
        assert!(cp.calls().is_empty());
    }
}
