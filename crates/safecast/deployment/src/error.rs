//! Deployment error types

use safecast_control::{ControlPlaneError, HealthStatus};
use safecast_observability::ObservabilityError;
use safecast_state::StateError;
use safecast_templates::TemplateError;
use safecast_types::{EnvironmentClass, TierKind};
use thiserror::Error;

/// Deployment errors
#[derive(Debug, Error)]
pub enum DeploymentError {
    #[error("Environment {name} is not healthy (health: {health}), refusing to deploy")]
    EnvironmentNotHealthy { name: String, health: HealthStatus },

    #[error("Timed out after {waited_secs}s waiting for {name} to become healthy")]
    EnvironmentUpdateTimedOut { name: String, waited_secs: u64 },

    #[error("No running {kind} tier in {class} to replace")]
    MissingTier {
        class: EnvironmentClass,
        kind: TierKind,
    },

    #[error("No version planned for {name}")]
    MissingVersion { name: String },

    #[error("Invalid rollout configuration: {0}")]
    InvalidConfig(String),

    #[error("State error: {0}")]
    State(#[from] StateError),

    #[error("Control plane error: {0}")]
    ControlPlane(#[from] ControlPlaneError),

    #[error("Template sync error: {0}")]
    Templates(#[from] TemplateError),

    #[error("Audit error: {0}")]
    Audit(#[from] ObservabilityError),
}

/// Result type for deployment operations
pub type Result<T> = std::result::Result<T, DeploymentError>;
