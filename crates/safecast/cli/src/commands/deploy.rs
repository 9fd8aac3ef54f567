//! Deployment commands

use super::Services;
use crate::error::CliResult;
use crate::output::{self, print_info, print_success, OutputFormat};
use safecast_deployment::{DeploymentManager, DeploymentRequest};
use safecast_types::{DeploymentRecord, EnvironmentClass, TierChange, TierKind};
use serde::Serialize;
use tabled::Tabled;

/// Table row for one replaced or updated tier
#[derive(Debug, Serialize, Tabled)]
struct ChangeRow {
    role: String,
    from: String,
    to: String,
    old_version: String,
    new_version: String,
    diff: String,
}

impl ChangeRow {
    fn new(kind: TierKind, change: &TierChange) -> Self {
        let or_dash = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".into());
        Self {
            role: kind.to_string(),
            from: change.old_env.clone(),
            to: change.new_env.clone(),
            old_version: or_dash(&change.old_version),
            new_version: or_dash(&change.new_version),
            diff: or_dash(&change.github_diff),
        }
    }
}

fn change_rows(record: &DeploymentRecord) -> Vec<ChangeRow> {
    TierKind::ROLLOUT_ORDER
        .into_iter()
        .filter_map(|kind| record.tier(kind).map(|change| ChangeRow::new(kind, change)))
        .collect()
}

async fn run(
    services: &Services,
    request: DeploymentRequest,
    format: OutputFormat,
) -> CliResult<()> {
    let manager = DeploymentManager::new(
        services.control.clone(),
        services.sink.clone(),
        services.config.rollout.clone(),
    );
    let record = manager.run(request).await?;

    if matches!(format, OutputFormat::Table) {
        output::print_output(change_rows(&record), format, "No tiers changed")?;
        print_success(&format!(
            "Deployed {} {} in {:.0}s",
            record.app, record.env, record.elapsed_time
        ));
        Ok(())
    } else {
        output::print_single(&record, format)
    }
}

/// Deploy a version onto the running environments
pub async fn same_env(
    services: &Services,
    app: &str,
    env: EnvironmentClass,
    version: &str,
    format: OutputFormat,
) -> CliResult<()> {
    print_info(&format!("Deploying {version} to {app} {env} in place"));
    run(
        services,
        DeploymentRequest::same_environment(app, env, version),
        format,
    )
    .await
}

/// Replace the environments with new ones on a platform
pub async fn new_env(
    services: &Services,
    app: &str,
    env: EnvironmentClass,
    version: &str,
    platform_arn: &str,
    skip_templates: bool,
    format: OutputFormat,
) -> CliResult<()> {
    print_info(&format!(
        "Deploying {version} to new {app} {env} environments on {platform_arn}"
    ));
    let mut request =
        DeploymentRequest::new_environment(app, env, Some(version.to_string()), platform_arn);
    if skip_templates {
        request = request.without_template_sync();
    }
    run(services, request, format).await
}
