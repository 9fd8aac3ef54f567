//! Template synchronizer
//!
//! For every tier in scope the saved template of its slot is deleted and
//! recreated from the tier's live configuration. The control plane needs a
//! pause between deleting and recreating a template of the same name.

use crate::error::Result;
use async_trait::async_trait;
use chrono::Utc;
use safecast_control::ControlPlane;
use safecast_observability::AuditSink;
use safecast_state::discover;
use safecast_types::{
    template_name, AuditRecord, EnvironmentClass, TemplateSyncRecord, Tier, TierKind,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Applications refreshed when the scope names none
pub const DEFAULT_APPLICATIONS: [&str; 3] = ["api", "ingest", "reporting"];

/// Which tiers to refresh; `None` means every value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateScope {
    pub application: Option<String>,
    pub class: Option<EnvironmentClass>,
    pub kind: Option<TierKind>,
}

impl TemplateScope {
    pub fn all() -> Self {
        Self::default()
    }

    /// Every tier of one environment class of one application
    pub fn environment(application: impl Into<String>, class: EnvironmentClass) -> Self {
        Self {
            application: Some(application.into()),
            class: Some(class),
            kind: None,
        }
    }

    fn classes(&self) -> Vec<EnvironmentClass> {
        self.class.map_or_else(|| EnvironmentClass::ALL.to_vec(), |c| vec![c])
    }

    fn kinds(&self) -> Vec<TierKind> {
        self.kind.map_or_else(|| TierKind::ALL.to_vec(), |k| vec![k])
    }
}

/// Refreshes saved configuration templates from live tiers
#[async_trait]
pub trait ConfigTemplateSync: Send + Sync {
    /// Refresh every template in scope and hand the records to the audit
    /// sink as one batch.
    async fn run(&self, scope: &TemplateScope) -> Result<Vec<TemplateSyncRecord>>;
}

/// Control-plane backed template synchronizer.
///
/// Runs strictly one tier at a time.
pub struct TemplateSynchronizer {
    control: Arc<dyn ControlPlane>,
    sink: Arc<dyn AuditSink>,
    settle: Duration,
    applications: Vec<String>,
}

impl TemplateSynchronizer {
    pub fn new(control: Arc<dyn ControlPlane>, sink: Arc<dyn AuditSink>) -> Self {
        Self {
            control,
            sink,
            settle: Duration::from_secs(5),
            applications: DEFAULT_APPLICATIONS.iter().map(|a| a.to_string()).collect(),
        }
    }

    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    pub fn with_applications(mut self, applications: Vec<String>) -> Self {
        self.applications = applications;
        self
    }

    pub fn applications(&self) -> &[String] {
        &self.applications
    }

    async fn refresh(&self, application: &str, tier: &Tier) -> Result<Option<TemplateSyncRecord>> {
        let Some(resource_id) = tier.resource_id.as_deref() else {
            warn!(env_name = %tier.name, "Tier has no resource id, skipping template");
            return Ok(None);
        };

        let template = template_name(tier.class, tier.kind);
        let started_at = Utc::now();

        info!(
            application,
            template = %template,
            source = %tier.name,
            "Refreshing configuration template"
        );
        match self
            .control
            .delete_configuration_template(application, &template)
            .await
        {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                info!(application, template = %template, "No existing template to delete");
            }
            Err(e) => return Err(e.into()),
        }

        info!(seconds = self.settle.as_secs(), "Waiting before recreating template");
        tokio::time::sleep(self.settle).await;

        self.control
            .create_configuration_template(application, &template, resource_id)
            .await?;

        Ok(Some(TemplateSyncRecord::new(
            tier,
            application,
            template,
            started_at,
        )))
    }
}

#[async_trait]
impl ConfigTemplateSync for TemplateSynchronizer {
    #[instrument(skip(self))]
    async fn run(&self, scope: &TemplateScope) -> Result<Vec<TemplateSyncRecord>> {
        let applications = match &scope.application {
            Some(app) => vec![app.clone()],
            None => self.applications.clone(),
        };

        let mut completed = Vec::new();
        for application in &applications {
            let state = discover(self.control.as_ref(), application).await?;

            for class in scope.classes() {
                for kind in scope.kinds() {
                    let Some(tier) = state.topology.tier(class, kind) else {
                        warn!(
                            application = %application,
                            class = %class,
                            kind = %kind,
                            "No live tier, skipping template"
                        );
                        continue;
                    };
                    if let Some(record) = self.refresh(application, tier).await? {
                        completed.push(record);
                    }
                }
            }
        }

        let batch: Vec<AuditRecord> = completed.iter().cloned().map(AuditRecord::from).collect();
        self.sink.record_batch(&batch).await?;

        info!(templates = completed.len(), "Template sync complete");
        Ok(completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TemplateError;
    use safecast_control::{ControlPlaneCall, InMemoryControlPlane};
    use safecast_observability::MemoryAuditSink;

    fn setup() -> (Arc<InMemoryControlPlane>, Arc<MemoryAuditSink>, TemplateSynchronizer) {
        let cp = Arc::new(InMemoryControlPlane::new());
        let sink = Arc::new(MemoryAuditSink::new());
        let sync = TemplateSynchronizer::new(cp.clone(), sink.clone());
        (cp, sink, sync)
    }

    #[tokio::test(start_paused = true)]
    async fn test_refreshes_every_tier_of_environment() {
        let (cp, sink, sync) = setup();
        let web_id = cp.add_environment("api", "safecastapi-dev-021", "arn", None);
        let wrk_id = cp.add_environment("api", "safecastapi-dev-wrk-021", "arn", None);
        cp.add_environment("api", "safecastapi-prd-004", "arn", None);
        cp.add_template("api", "dev", serde_json::json!({}));

        let records = sync
            .run(&TemplateScope::environment("api", EnvironmentClass::Development))
            .await
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].template_name, "dev");
        assert_eq!(records[1].template_name, "dev-wrk");
        assert_eq!(records[1].source_env_name, "safecastapi-dev-wrk-021");
        assert_eq!(cp.template_source("api", "dev"), Some(web_id));
        assert_eq!(cp.template_source("api", "dev-wrk"), Some(wrk_id));
        assert_eq!(cp.template_source("api", "prd"), None);
        assert_eq!(sink.batch_sizes(), vec![2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_precedes_create() {
        let (cp, _sink, sync) = setup();
        cp.add_environment("ingest", "safecastingest-prd-001", "arn", None);

        let scope = TemplateScope {
            application: Some("ingest".into()),
            class: Some(EnvironmentClass::Production),
            kind: Some(TierKind::Web),
        };
        sync.run(&scope).await.unwrap();

        let mutations = cp.mutations();
        assert_eq!(mutations.len(), 2);
        assert!(matches!(
            &mutations[0],
            ControlPlaneCall::DeleteConfigurationTemplate { template, .. } if template == "prd"
        ));
        assert!(matches!(
            &mutations[1],
            ControlPlaneCall::CreateConfigurationTemplate { template, .. } if template == "prd"
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_applications() {
        let (cp, sink, sync) = setup();
        cp.add_environment("api", "safecastapi-dev-001", "arn", None);
        cp.add_environment("reporting", "safecastreporting-prd-002", "arn", None);

        let records = sync.run(&TemplateScope::all()).await.unwrap();
        let apps: Vec<_> = records.iter().map(|r| r.app.as_str()).collect();
        assert_eq!(apps, vec!["api", "reporting"]);
        assert_eq!(sink.records().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_failure_propagates() {
        let (cp, sink, sync) = setup();
        cp.add_environment("api", "safecastapi-dev-001", "arn", None);
        cp.fail_next("create_configuration_template", "limit exceeded");

        let err = sync
            .run(&TemplateScope::environment("api", EnvironmentClass::Development))
            .await
            .unwrap_err();
        assert!(matches!(err, TemplateError::ControlPlane(_)));
        assert!(sink.records().is_empty());
    }
}
