//! Deployment Manager - High-level deployment operations
//!
//! The manager runs one deployment end to end: discover the live topology,
//! plan the target, pick the strategy, execute it and hand the resulting
//! record to the audit sink.

use crate::config::RolloutConfig;
use crate::context::RolloutContext;
use crate::error::Result;
use crate::strategies;
use safecast_control::ControlPlane;
use safecast_observability::AuditSink;
use safecast_state::{discover, plan, PlanRequest};
use safecast_templates::{ConfigTemplateSync, TemplateSynchronizer};
use safecast_types::{AuditRecord, DeploymentRecord, EnvironmentClass};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};

/// How a deployment reaches its target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RolloutStrategy {
    /// Deploy a version onto the running environments
    InPlace { version: String },
    /// Replace the environments with new ones on a platform
    BlueGreen {
        version: Option<String>,
        platform_arn: String,
        sync_templates: bool,
    },
}

/// One requested deployment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentRequest {
    pub application: String,
    pub class: EnvironmentClass,
    pub strategy: RolloutStrategy,
}

impl DeploymentRequest {
    pub fn same_environment(
        application: impl Into<String>,
        class: EnvironmentClass,
        version: impl Into<String>,
    ) -> Self {
        Self {
            application: application.into(),
            class,
            strategy: RolloutStrategy::InPlace {
                version: version.into(),
            },
        }
    }

    pub fn new_environment(
        application: impl Into<String>,
        class: EnvironmentClass,
        version: Option<String>,
        platform_arn: impl Into<String>,
    ) -> Self {
        Self {
            application: application.into(),
            class,
            strategy: RolloutStrategy::BlueGreen {
                version,
                platform_arn: platform_arn.into(),
                sync_templates: true,
            },
        }
    }

    pub fn without_template_sync(mut self) -> Self {
        if let RolloutStrategy::BlueGreen { sync_templates, .. } = &mut self.strategy {
            *sync_templates = false;
        }
        self
    }

    fn plan_request(&self) -> PlanRequest {
        match &self.strategy {
            RolloutStrategy::InPlace { version } => PlanRequest::in_place(self.class, version),
            RolloutStrategy::BlueGreen {
                version,
                platform_arn,
                ..
            } => PlanRequest::blue_green(self.class, version.clone(), platform_arn),
        }
    }
}

/// Deployment Manager runs deployments against one control plane
pub struct DeploymentManager {
    control: Arc<dyn ControlPlane>,
    sink: Arc<dyn AuditSink>,
    templates: Arc<dyn ConfigTemplateSync>,
    config: RolloutConfig,
}

impl DeploymentManager {
    pub fn new(
        control: Arc<dyn ControlPlane>,
        sink: Arc<dyn AuditSink>,
        config: RolloutConfig,
    ) -> Self {
        let templates = Arc::new(
            TemplateSynchronizer::new(control.clone(), sink.clone())
                .with_settle(config.template_settle()),
        );

        Self {
            control,
            sink,
            templates,
            config,
        }
    }

    /// Replace the template synchronizer used by blue-green rollouts
    pub fn with_templates(mut self, templates: Arc<dyn ConfigTemplateSync>) -> Self {
        self.templates = templates;
        self
    }

    pub fn config(&self) -> &RolloutConfig {
        &self.config
    }

    #[instrument(skip(self), fields(application = %request.application, class = %request.class))]
    pub async fn run(&self, request: DeploymentRequest) -> Result<DeploymentRecord> {
        self.config.validate()?;

        let state = discover(self.control.as_ref(), &request.application).await?;
        let planned = plan(&state.topology, &state.versions, &request.plan_request())?;

        let executor = strategies::create_executor(&request.strategy, self.templates.clone());
        info!(strategy = executor.name(), "Executing deployment");

        let ctx = RolloutContext::new(
            self.control.clone(),
            request.application.clone(),
            self.config.clone(),
        );
        let record = executor
            .execute(request.class, &state.topology, &planned, &ctx)
            .await?;

        self.sink
            .record(&AuditRecord::Deployment(record.clone()))
            .await?;

        Ok(record)
    }
}
