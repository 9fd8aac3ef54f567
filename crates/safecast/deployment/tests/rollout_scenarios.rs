//! End-to-end rollouts against the in-memory control plane.
//!
//! Each test seeds a fleet, runs the deployment manager and inspects the
//! journal of control-plane mutations and the audit record.

use chrono::{Duration as ChronoDuration, Utc};
use safecast_control::{
    ControlPlaneCall, EnvironmentUpdate, HealthStatus, InMemoryControlPlane, VersionStatus,
};
use safecast_deployment::{DeploymentError, DeploymentManager, DeploymentRequest, RolloutConfig};
use safecast_observability::MemoryAuditSink;
use safecast_state::StateError;
use safecast_types::{AuditRecord, DeploymentEvent, EnvironmentClass};
use std::sync::Arc;

const OLD: &str = "api-main-100-aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
const NEW: &str = "api-main-101-bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Fleet {
    control: Arc<InMemoryControlPlane>,
    sink: Arc<MemoryAuditSink>,
    manager: DeploymentManager,
}

fn fleet(with_worker: bool) -> Fleet {
    let control = Arc::new(InMemoryControlPlane::new());
    control.add_environment("api", "safecastapi-dev-021", "arn:ruby-2.6", Some(OLD));
    if with_worker {
        control.add_environment("api", "safecastapi-dev-wrk-021", "arn:ruby-2.6", Some(OLD));
    }
    let now = Utc::now();
    control.add_version("api", OLD, now - ChronoDuration::days(2), VersionStatus::Processed);
    control.add_version("api", NEW, now, VersionStatus::Processed);
    control.add_version("api", "api-main-99", now - ChronoDuration::days(3), VersionStatus::Failed);

    let sink = Arc::new(MemoryAuditSink::new());
    let manager = DeploymentManager::new(control.clone(), sink.clone(), RolloutConfig::default());

    Fleet {
        control,
        sink,
        manager,
    }
}

fn terminations(calls: &[ControlPlaneCall]) -> usize {
    calls
        .iter()
        .filter(|c| matches!(c, ControlPlaneCall::TerminateEnvironment { .. }))
        .count()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn same_environment_update_links_commits() {
    let fleet = fleet(false);
    fleet.control.script_health(
        "safecastapi-dev-021",
        [HealthStatus::Ok, HealthStatus::Pending, HealthStatus::Ok],
    );

    let record = fleet
        .manager
        .run(DeploymentRequest::same_environment("api", EnvironmentClass::Development, NEW))
        .await
        .unwrap();

    assert_eq!(
        fleet.control.mutations(),
        vec![ControlPlaneCall::UpdateEnvironment {
            application: "api".into(),
            name: "safecastapi-dev-021".into(),
            update: EnvironmentUpdate::Version {
                version_label: NEW.into()
            },
        }]
    );

    assert_eq!(record.event, DeploymentEvent::SameEnvironment);
    let web = record.web.as_ref().unwrap();
    assert_eq!(web.old_env, "safecastapi-dev-021");
    assert_eq!(web.new_env, "safecastapi-dev-021");
    assert_eq!(
        web.github_diff.as_deref(),
        Some(
            "https://github.com/Safecast/safecastapi/compare/\
             aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa...bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb"
        )
    );
    assert!(record.wrk.is_none());

    let audited = fleet.sink.records();
    assert_eq!(audited, vec![AuditRecord::Deployment(record)]);
}

#[tokio::test(start_paused = true)]
async fn blue_green_with_worker_moves_both_to_next_rotation() {
    let fleet = fleet(true);

    let record = fleet
        .manager
        .run(
            DeploymentRequest::new_environment(
                "api",
                EnvironmentClass::Development,
                Some(NEW.into()),
                "arn:ruby-3.2",
            )
            .without_template_sync(),
        )
        .await
        .unwrap();

    let steps: Vec<String> = fleet
        .control
        .mutations()
        .into_iter()
        .map(|call| match call {
            ControlPlaneCall::UpdateEnvironment { name, .. } => format!("drain {name}"),
            ControlPlaneCall::CreateEnvironment(req) => format!("create {}", req.name),
            ControlPlaneCall::TerminateEnvironment { name } => format!("terminate {name}"),
            ControlPlaneCall::SwapEnvironmentCnames {
                source,
                destination,
            } => format!("swap {source} {destination}"),
            other => format!("{other:?}"),
        })
        .collect();
    assert_eq!(
        steps,
        vec![
            "drain safecastapi-dev-wrk-021",
            "create safecastapi-dev-wrk-022",
            "terminate safecastapi-dev-wrk-021",
            "create safecastapi-dev-022",
            "swap safecastapi-dev-021 safecastapi-dev-022",
            "terminate safecastapi-dev-021",
        ]
    );

    let web = fleet.control.environment("safecastapi-dev-022").unwrap();
    assert_eq!(web.platform_arn, "arn:ruby-3.2");
    assert_eq!(web.version_label.as_deref(), Some(NEW));

    assert_eq!(record.event, DeploymentEvent::NewEnvironment);
    assert_eq!(record.wrk.as_ref().unwrap().new_env, "safecastapi-dev-wrk-022");
    assert_eq!(record.web.as_ref().unwrap().old_env, "safecastapi-dev-021");
    assert!(record.web.as_ref().unwrap().github_diff.is_some());
}

#[tokio::test(start_paused = true)]
async fn blue_green_refreshes_templates_by_default() {
    let fleet = fleet(true);

    fleet
        .manager
        .run(DeploymentRequest::new_environment(
            "api",
            EnvironmentClass::Development,
            None,
            "arn:ruby-3.2",
        ))
        .await
        .unwrap();

    let records = fleet.sink.records();
    assert_eq!(records.len(), 3);
    assert!(matches!(records[0], AuditRecord::TemplateSync(_)));
    assert!(matches!(records[2], AuditRecord::Deployment(_)));
    assert!(fleet.control.template_source("api", "dev-wrk").is_some());

    let web = fleet.control.environment("safecastapi-dev-022").unwrap();
    assert_eq!(web.version_label.as_deref(), Some(OLD));
}

#[tokio::test(start_paused = true)]
async fn health_timeout_leaves_old_environment_running() {
    let fleet = fleet(false);
    fleet
        .control
        .script_health("safecastapi-dev-022", [HealthStatus::Pending]);

    let err = fleet
        .manager
        .run(
            DeploymentRequest::new_environment(
                "api",
                EnvironmentClass::Development,
                Some(NEW.into()),
                "arn:ruby-3.2",
            )
            .without_template_sync(),
        )
        .await
        .unwrap_err();

    match err {
        DeploymentError::EnvironmentUpdateTimedOut { name, waited_secs } => {
            assert_eq!(name, "safecastapi-dev-022");
            assert!(waited_secs >= 540);
        }
        other => panic!("unexpected error: {other}"),
    }

    let calls = fleet.control.calls();
    assert_eq!(terminations(&calls), 0);
    assert!(fleet.control.environment("safecastapi-dev-021").is_some());
    assert!(fleet.control.environment("safecastapi-dev-022").is_some());
    assert!(fleet.sink.records().is_empty());
}

#[tokio::test(start_paused = true)]
async fn failed_version_is_refused_before_any_change() {
    let fleet = fleet(true);

    let err = fleet
        .manager
        .run(DeploymentRequest::same_environment(
            "api",
            EnvironmentClass::Development,
            "api-main-99",
        ))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DeploymentError::State(StateError::VersionFailed(_))
    ));
    assert!(fleet.control.mutations().is_empty());
}

#[tokio::test(start_paused = true)]
async fn control_plane_failure_stops_rollout() {
    let fleet = fleet(true);
    fleet
        .control
        .fail_next("create_environment", "insufficient capacity");

    let err = fleet
        .manager
        .run(
            DeploymentRequest::new_environment(
                "api",
                EnvironmentClass::Development,
                Some(NEW.into()),
                "arn:ruby-3.2",
            )
            .without_template_sync(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, DeploymentError::ControlPlane(_)));
    let calls = fleet.control.calls();
    assert_eq!(terminations(&calls), 0);
    assert_eq!(
        fleet.control.scaling_bounds("safecastapi-dev-wrk-021"),
        Some((0, 0))
    );
}

#[tokio::test(start_paused = true)]
async fn uneven_rotation_wrap_is_refused_before_draining() {
    let control = Arc::new(InMemoryControlPlane::new());
    control.add_environment("api", "safecastapi-dev-999", "arn:ruby-2.6", Some(OLD));
    control.add_environment("api", "safecastapi-dev-wrk-000", "arn:ruby-2.6", Some(OLD));
    control.add_version("api", NEW, Utc::now(), VersionStatus::Processed);
    let manager = DeploymentManager::new(
        control.clone(),
        Arc::new(MemoryAuditSink::new()),
        RolloutConfig::default(),
    );

    let err = manager
        .run(
            DeploymentRequest::new_environment(
                "api",
                EnvironmentClass::Development,
                Some(NEW.into()),
                "arn:ruby-3.2",
            )
            .without_template_sync(),
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DeploymentError::State(StateError::NameCollision { ref name, .. })
            if name == "safecastapi-dev-wrk-000"
    ));
    assert!(control.mutations().is_empty());
    assert_eq!(control.scaling_bounds("safecastapi-dev-wrk-000"), None);
}
