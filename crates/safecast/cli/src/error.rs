//! CLI error types

use thiserror::Error;

/// CLI error types
#[derive(Debug, Error)]
pub enum CliError {
    /// Control-plane request failed
    #[error("{0}")]
    ControlPlane(#[from] safecast_control::ControlPlaneError),

    /// Discovery or planning failed
    #[error("{0}")]
    State(#[from] safecast_state::StateError),

    /// Rollout failed
    #[error("{0}")]
    Deployment(#[from] safecast_deployment::DeploymentError),

    /// Template sync failed
    #[error("{0}")]
    Templates(#[from] safecast_templates::TemplateError),

    /// Audit sink failed
    #[error("{0}")]
    Audit(#[from] safecast_observability::ObservabilityError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;
