//! Control-plane capability trait and wire types

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A live (non-deleted) platform environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentDescription {
    pub name: String,
    pub environment_id: String,
    pub platform_arn: String,
    pub version_label: Option<String>,
}

/// Processing status of an uploaded application version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VersionStatus {
    Processed,
    Unprocessed,
    Processing,
    Building,
    Failed,
}

/// An application version known to the control plane
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationVersion {
    pub version_label: String,
    pub updated_at: DateTime<Utc>,
    pub status: VersionStatus,
}

/// Request to launch a new environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateEnvironment {
    pub application: String,
    pub name: String,
    pub platform_arn: String,
    pub template_name: String,
    pub version_label: Option<String>,
}

/// Change applied to a running environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EnvironmentUpdate {
    /// Deploy a different application version in place
    Version { version_label: String },
    /// Set the autoscaling group bounds
    ScalingBounds { min_size: u32, max_size: u32 },
}

/// Aggregate environment health as reported by enhanced health reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    NoData,
    Unknown,
    Pending,
    Ok,
    Info,
    Warning,
    Degraded,
    Severe,
    Suspended,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, HealthStatus::Ok)
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Everything the orchestrator may ask of the platform.
///
/// Implementations must not retry on their own; callers decide what a
/// failure means for the rollout.
#[async_trait]
pub trait ControlPlane: Send + Sync {
    /// Non-deleted environments owned by an application
    async fn list_environments(&self, application: &str) -> Result<Vec<EnvironmentDescription>>;

    /// Application versions, in no particular order
    async fn list_application_versions(&self, application: &str)
        -> Result<Vec<ApplicationVersion>>;

    async fn create_environment(&self, request: &CreateEnvironment) -> Result<()>;

    async fn update_environment(
        &self,
        application: &str,
        name: &str,
        update: &EnvironmentUpdate,
    ) -> Result<()>;

    async fn describe_environment_health(&self, name: &str) -> Result<HealthStatus>;

    /// Exchange the CNAMEs of two environments
    async fn swap_environment_cnames(&self, source: &str, destination: &str) -> Result<()>;

    async fn terminate_environment(&self, name: &str) -> Result<()>;

    async fn delete_configuration_template(&self, application: &str, template: &str)
        -> Result<()>;

    /// Save the live configuration of an environment as a template
    async fn create_configuration_template(
        &self,
        application: &str,
        template: &str,
        source_environment_id: &str,
    ) -> Result<()>;

    /// Settings stored in a saved configuration template
    async fn describe_configuration_template(
        &self,
        application: &str,
        template: &str,
    ) -> Result<serde_json::Value>;

    /// Currently recommended platform ARNs for a programming language
    async fn list_platform_versions(&self, language: &str) -> Result<Vec<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_status_wire_names() {
        assert_eq!(serde_json::to_string(&VersionStatus::Failed).unwrap(), "\"FAILED\"");
        let status: VersionStatus = serde_json::from_str("\"UNPROCESSED\"").unwrap();
        assert_eq!(status, VersionStatus::Unprocessed);
    }

    #[test]
    fn test_update_wire_shape() {
        let update = EnvironmentUpdate::ScalingBounds {
            min_size: 0,
            max_size: 0,
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json["type"], "scaling_bounds");
        assert_eq!(json["max_size"], 0);
    }

    #[test]
    fn test_only_ok_is_ok() {
        assert!(HealthStatus::Ok.is_ok());
        assert!(!HealthStatus::Info.is_ok());
        assert!(!HealthStatus::Pending.is_ok());
        assert_eq!(HealthStatus::Degraded.to_string(), "Degraded");
    }
}
