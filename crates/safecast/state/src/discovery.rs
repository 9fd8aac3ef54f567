//! Topology discovery
//!
//! Reads the live environments and versions of one application and
//! assembles the observed [`TopologySnapshot`]. Names that do not follow the
//! naming grammar are skipped with a warning; two environments claiming the
//! same slot abort discovery.

use crate::catalog::VersionCatalog;
use crate::error::Result;
use safecast_control::{ControlPlane, EnvironmentDescription};
use safecast_types::{parse_environment_name, Tier, TopologySnapshot};
use tracing::{debug, info, instrument, warn};

/// Everything discovery learned about an application
#[derive(Debug, Clone)]
pub struct DiscoveredState {
    pub topology: TopologySnapshot,
    pub versions: VersionCatalog,
}

#[instrument(skip(control))]
pub async fn discover(control: &dyn ControlPlane, application: &str) -> Result<DiscoveredState> {
    let environments = control.list_environments(application).await?;
    let topology = assemble(application, environments)?;

    let versions = VersionCatalog::classify(control.list_application_versions(application).await?);

    info!(
        application,
        tiers = topology.tier_count(),
        available = versions.available.len(),
        failed = versions.failed.len(),
        "Discovered topology"
    );

    Ok(DiscoveredState { topology, versions })
}

fn assemble(
    application: &str,
    environments: Vec<EnvironmentDescription>,
) -> Result<TopologySnapshot> {
    let mut topology = TopologySnapshot::new(application);

    for env in environments {
        let slot = match parse_environment_name(application, &env.name) {
            Ok(slot) => slot,
            Err(e) => {
                warn!(env_name = %env.name, "Skipping environment: {}", e);
                continue;
            }
        };

        let mut tier = Tier::new(
            application,
            slot.class,
            slot.kind,
            slot.rotation,
            env.platform_arn,
        )
        .with_resource_id(env.environment_id);

        if let Some(label) = env.version_label {
            tier = tier.with_version_label(label);
            if tier.parsed_version.is_none() {
                warn!(
                    env_name = %tier.name,
                    version = tier.version_label.as_deref().unwrap_or_default(),
                    "Version label does not follow the version grammar"
                );
            }
        }

        debug!(
            env_name = %tier.name,
            class = %tier.class,
            kind = %tier.kind,
            rotation = %tier.rotation,
            "Found tier"
        );
        topology.insert(tier)?;
    }

    Ok(topology)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StateError;
    use chrono::Utc;
    use safecast_control::{InMemoryControlPlane, VersionStatus};
    use parking_lot::Mutex;
    use safecast_types::{EnvironmentClass, TierKind};
    use std::io;
    use std::sync::Arc;
    use tracing_subscriber::fmt::MakeWriter;

    /// Collects formatted log lines for inspection.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock()).into_owned()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[tokio::test]
    async fn test_discover_groups_by_slot() {
        let cp = InMemoryControlPlane::new();
        cp.add_environment("api", "safecastapi-dev-021", "arn:ruby", Some("api-main-100"));
        cp.add_environment("api", "safecastapi-dev-wrk-021", "arn:ruby", Some("api-main-100"));
        cp.add_environment("api", "safecastapi-prd-007", "arn:ruby", Some("api-main-99"));
        cp.add_version("api", "api-main-100", Utc::now(), VersionStatus::Processed);

        let state = discover(&cp, "api").await.unwrap();
        assert_eq!(state.topology.tier_count(), 3);

        let worker = state
            .topology
            .tier(EnvironmentClass::Development, TierKind::Worker)
            .unwrap();
        assert_eq!(worker.rotation.value(), 21);
        assert!(worker.resource_id.is_some());
        assert_eq!(worker.parsed_version.as_ref().unwrap().build_number, 100);

        let prd = state
            .topology
            .tier(EnvironmentClass::Production, TierKind::Web)
            .unwrap();
        assert_eq!(prd.name, "safecastapi-prd-007");
        assert_eq!(state.versions.available.len(), 1);
    }

    #[tokio::test]
    async fn test_foreign_names_are_skipped() {
        let cp = InMemoryControlPlane::new();
        cp.add_environment("api", "safecastapi-dev-021", "arn", None);
        cp.add_environment("api", "safecastapi-dev", "arn", None);
        cp.add_environment("api", "legacy-api-prod", "arn", None);
        cp.add_environment("api", "safecastapi-stg-001", "arn", None);

        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .without_time()
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let state = discover(&cp, "api").await.unwrap();
        assert_eq!(state.topology.tier_count(), 1);

        let output = logs.contents();
        for skipped in ["safecastapi-dev", "legacy-api-prod", "safecastapi-stg-001"] {
            let field = format!("env_name={skipped}");
            assert!(
                output
                    .lines()
                    .any(|line| line.contains("WARN") && line.contains(&field)),
                "no warning for {skipped}: {output}"
            );
        }
        assert!(!output.contains("env_name=safecastapi-dev-021"));
    }

    #[tokio::test]
    async fn test_duplicate_slot_is_fatal() {
        let cp = InMemoryControlPlane::new();
        cp.add_environment("api", "safecastapi-dev-021", "arn", None);
        cp.add_environment("api", "safecastapi-dev-022", "arn", None);

        let err = discover(&cp, "api").await.unwrap_err();
        match err {
            StateError::DuplicateEnvironment(slot) => {
                assert_eq!(slot.class, EnvironmentClass::Development);
                assert_eq!(slot.kind, TierKind::Web);
                assert_eq!(slot.existing, "safecastapi-dev-021");
                assert_eq!(slot.duplicate, "safecastapi-dev-022");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_foreign_version_label_is_kept() {
        let cp = InMemoryControlPlane::new();
        cp.add_environment("api", "safecastapi-dev-021", "arn", Some("hand-built"));

        let state = discover(&cp, "api").await.unwrap();
        let web = state
            .topology
            .tier(EnvironmentClass::Development, TierKind::Web)
            .unwrap();
        assert_eq!(web.version_label.as_deref(), Some("hand-built"));
        assert!(web.parsed_version.is_none());
    }

    #[tokio::test]
    async fn test_control_plane_error_propagates() {
        let cp = InMemoryControlPlane::new();
        cp.fail_next("list_environments", "throttled");
        assert!(matches!(
            discover(&cp, "api").await,
            Err(StateError::ControlPlane(_))
        ));
    }
}
