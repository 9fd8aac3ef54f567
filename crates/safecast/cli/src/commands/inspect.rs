//! Read-only commands: versions, platforms, templates and topology

use super::Services;
use crate::error::CliResult;
use crate::output::{self, print_info, OutputFormat};
use safecast_state::{discover, VersionCatalog};
use safecast_types::{Tier, TopologySnapshot};
use serde::Serialize;
use tabled::Tabled;

/// Table row for application versions
#[derive(Debug, Serialize, Tabled)]
struct VersionRow {
    version: String,
    status: String,
    updated: String,
}

/// Table row for a running tier
#[derive(Debug, Serialize, Tabled)]
struct TierRow {
    env: String,
    role: String,
    name: String,
    rotation: String,
    version: String,
    build: String,
    platform: String,
}

impl From<&Tier> for TierRow {
    fn from(tier: &Tier) -> Self {
        Self {
            env: tier.class.to_string(),
            role: tier.kind.to_string(),
            name: tier.name.clone(),
            rotation: tier.rotation.to_string(),
            version: tier.version_label.clone().unwrap_or_else(|| "-".into()),
            build: tier
                .parsed_version
                .as_ref()
                .map(|v| v.build_number.to_string())
                .unwrap_or_else(|| "-".into()),
            platform: tier.platform_arn.clone(),
        }
    }
}

/// Table row for a platform ARN
#[derive(Debug, Serialize, Tabled)]
struct PlatformRow {
    platform_arn: String,
}

fn version_rows(catalog: &VersionCatalog) -> Vec<VersionRow> {
    catalog
        .available
        .iter()
        .chain(catalog.failed.iter())
        .map(|v| VersionRow {
            version: v.version_label.clone(),
            status: format!("{:?}", v.status),
            updated: v.updated_at.format("%Y-%m-%d %H:%M").to_string(),
        })
        .collect()
}

fn tier_rows(topology: &TopologySnapshot) -> Vec<TierRow> {
    topology
        .envs
        .values()
        .flat_map(|tiers| tiers.values())
        .map(TierRow::from)
        .collect()
}

/// List deployable and failed versions of an application
pub async fn versions(services: &Services, app: &str, format: OutputFormat) -> CliResult<()> {
    let versions = services.control.list_application_versions(app).await?;
    let catalog = VersionCatalog::classify(versions);

    if matches!(format, OutputFormat::Table) {
        print_info(&format!(
            "{} available, {} failed",
            catalog.available.len(),
            catalog.failed.len()
        ));
        output::print_output(version_rows(&catalog), format, "No versions found")
    } else {
        output::print_single(&catalog, format)
    }
}

/// List recommended platform ARNs
pub async fn list_arns(services: &Services, language: &str, format: OutputFormat) -> CliResult<()> {
    let rows: Vec<PlatformRow> = services
        .control
        .list_platform_versions(language)
        .await?
        .into_iter()
        .map(|platform_arn| PlatformRow { platform_arn })
        .collect();
    output::print_output(rows, format, "No platforms found")
}

/// Show the settings stored in a saved configuration template
pub async fn desc_template(
    services: &Services,
    app: &str,
    template: &str,
    format: OutputFormat,
) -> CliResult<()> {
    let settings = services
        .control
        .describe_configuration_template(app, template)
        .await?;
    output::print_single(&settings, format)
}

/// Show the discovered topology of an application
pub async fn topology(services: &Services, app: &str, format: OutputFormat) -> CliResult<()> {
    let state = discover(services.control.as_ref(), app).await?;

    if matches!(format, OutputFormat::Table) {
        output::print_output(tier_rows(&state.topology), format, "No environments found")
    } else {
        output::print_single(&state.topology, format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use safecast_types::{EnvironmentClass, Rotation, TierKind};

    #[test]
    fn test_tier_row_without_version() {
        let tier = Tier::new(
            "api",
            EnvironmentClass::Production,
            TierKind::Worker,
            Rotation::new(3).unwrap(),
            "arn:ruby",
        );
        let row = TierRow::from(&tier);
        assert_eq!(row.name, "safecastapi-prd-wrk-003");
        assert_eq!(row.rotation, "003");
        assert_eq!(row.version, "-");
        assert_eq!(row.build, "-");
    }
}
