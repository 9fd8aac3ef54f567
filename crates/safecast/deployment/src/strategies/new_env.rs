//! Blue-green rollout strategy
//!
//! Each tier is replaced by a new environment at the planned rotation. The
//! old worker is scaled to zero before its replacement starts so the two
//! never consume the same queue. The old web tier keeps serving until the
//! replacement is healthy and the CNAMEs have been swapped.

use super::executor::{advance, tier_pairs, RolloutExecutor};
use crate::context::RolloutContext;
use crate::error::Result;
use async_trait::async_trait;
use safecast_templates::{ConfigTemplateSync, TemplateScope};
use safecast_types::{
    DeploymentEvent, DeploymentRecord, EnvironmentClass, Tier, TierKind, TopologySnapshot,
};
use std::fmt;
use std::sync::Arc;
use tracing::{info, instrument};

/// States of a blue-green rollout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewEnvPhase {
    Idle,
    TemplateSync,
    DrainWorker,
    CreateWorker,
    WaitWorkerHealthy,
    TerminateOldWorker,
    CreateWeb,
    WaitWebHealthy,
    SwapCnames,
    DrainWait,
    TerminateOldWeb,
    Done,
}

impl fmt::Display for NewEnvPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Blue-green rollout executor
///
/// Creates replacement environments, waits for them to become healthy,
/// then cuts over and terminates the originals.
#[derive(Default)]
pub struct BlueGreenExecutor {
    templates: Option<Arc<dyn ConfigTemplateSync>>,
}

impl BlueGreenExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refresh the class's saved templates before creating anything.
    pub fn with_templates(mut self, templates: Arc<dyn ConfigTemplateSync>) -> Self {
        self.templates = Some(templates);
        self
    }

    pub fn syncs_templates(&self) -> bool {
        self.templates.is_some()
    }

    async fn replace_worker(
        &self,
        phase: &mut NewEnvPhase,
        old: &Tier,
        new: &Tier,
        ctx: &RolloutContext,
    ) -> Result<()> {
        advance(self.name(), phase, NewEnvPhase::DrainWorker);
        ctx.scale_to_zero(old).await?;
        ctx.settle("draining old worker", ctx.config().worker_drain()).await;

        advance(self.name(), phase, NewEnvPhase::CreateWorker);
        ctx.create_environment(new).await?;

        advance(self.name(), phase, NewEnvPhase::WaitWorkerHealthy);
        ctx.wait_until_healthy(new).await?;

        advance(self.name(), phase, NewEnvPhase::TerminateOldWorker);
        ctx.terminate(old).await
    }

    async fn replace_web(
        &self,
        phase: &mut NewEnvPhase,
        old: &Tier,
        new: &Tier,
        ctx: &RolloutContext,
    ) -> Result<()> {
        advance(self.name(), phase, NewEnvPhase::CreateWeb);
        ctx.create_environment(new).await?;

        advance(self.name(), phase, NewEnvPhase::WaitWebHealthy);
        ctx.wait_until_healthy(new).await?;

        advance(self.name(), phase, NewEnvPhase::SwapCnames);
        ctx.swap_cnames(old, new).await?;

        advance(self.name(), phase, NewEnvPhase::DrainWait);
        ctx.settle("letting connections drain from old web tier", ctx.config().cname_settle())
            .await;

        advance(self.name(), phase, NewEnvPhase::TerminateOldWeb);
        ctx.terminate(old).await
    }
}

#[async_trait]
impl RolloutExecutor for BlueGreenExecutor {
    #[instrument(skip_all, fields(application = %ctx.application(), class = %class))]
    async fn execute(
        &self,
        class: EnvironmentClass,
        observed: &TopologySnapshot,
        planned: &TopologySnapshot,
        ctx: &RolloutContext,
    ) -> Result<DeploymentRecord> {
        let mut phase = NewEnvPhase::Idle;
        let pairs = tier_pairs(class, observed, planned)?;

        info!(
            tiers = pairs.len(),
            sync_templates = self.syncs_templates(),
            "Starting blue-green rollout"
        );

        let mut record =
            DeploymentRecord::started(ctx.application(), class, DeploymentEvent::NewEnvironment);

        if let Some(templates) = &self.templates {
            advance(self.name(), &mut phase, NewEnvPhase::TemplateSync);
            templates
                .run(&TemplateScope::environment(ctx.application(), class))
                .await?;
        }

        for (old, new) in pairs {
            info!(
                from = %old.name,
                to = %new.name,
                rotation = %new.rotation,
                "Replacing {} tier", new.kind
            );
            match new.kind {
                TierKind::Worker => self.replace_worker(&mut phase, old, new, ctx).await?,
                TierKind::Web => self.replace_web(&mut phase, old, new, ctx).await?,
            }
            record.set_tier(new.kind, ctx.change(old, new));
        }

        advance(self.name(), &mut phase, NewEnvPhase::Done);
        let record = record.complete();
        info!(elapsed_secs = record.elapsed_time, "Blue-green rollout completed");

        Ok(record)
    }

    fn name(&self) -> &str {
        "new-env"
    }
}
