//! Template commands

use super::Services;
use crate::error::CliResult;
use crate::output::{self, print_success, OutputFormat};
use safecast_templates::{ConfigTemplateSync, TemplateScope, TemplateSynchronizer};
use safecast_types::{EnvironmentClass, TemplateSyncRecord, TierKind};
use serde::Serialize;
use tabled::Tabled;

/// Table row for a refreshed template
#[derive(Debug, Serialize, Tabled)]
struct TemplateRow {
    app: String,
    template: String,
    source: String,
    elapsed: String,
}

impl From<&TemplateSyncRecord> for TemplateRow {
    fn from(record: &TemplateSyncRecord) -> Self {
        Self {
            app: record.app.clone(),
            template: record.template_name.clone(),
            source: record.source_env_name.clone(),
            elapsed: format!("{:.1}s", record.elapsed_time),
        }
    }
}

/// Refresh saved configuration templates from the live environments
pub async fn save_configs(
    services: &Services,
    app: Option<String>,
    env: Option<EnvironmentClass>,
    role: Option<TierKind>,
    format: OutputFormat,
) -> CliResult<()> {
    let mut synchronizer =
        TemplateSynchronizer::new(services.control.clone(), services.sink.clone())
            .with_settle(services.config.rollout.template_settle());
    if let Some(applications) = &services.config.applications {
        synchronizer = synchronizer.with_applications(applications.clone());
    }

    let scope = TemplateScope {
        application: app,
        class: env,
        kind: role,
    };
    let records = synchronizer.run(&scope).await?;

    if matches!(format, OutputFormat::Table) {
        let rows: Vec<TemplateRow> = records.iter().map(TemplateRow::from).collect();
        output::print_output(rows, format, "No templates refreshed")?;
        print_success(&format!("Refreshed {} templates", records.len()));
        Ok(())
    } else {
        output::print_single(&records, format)
    }
}
