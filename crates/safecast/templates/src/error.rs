//! Template synchronization errors

use safecast_control::ControlPlaneError;
use safecast_observability::ObservabilityError;
use safecast_state::StateError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("discovery failed: {0}")]
    State(#[from] StateError),

    #[error("control plane error: {0}")]
    ControlPlane(#[from] ControlPlaneError),

    #[error("audit error: {0}")]
    Audit(#[from] ObservabilityError),
}

pub type Result<T> = std::result::Result<T, TemplateError>;
