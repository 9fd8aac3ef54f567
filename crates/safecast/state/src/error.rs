//! State error types

use safecast_control::ControlPlaneError;
use safecast_types::{DuplicateSlot, EnvironmentClass};
use thiserror::Error;

/// Errors raised while discovering or planning a topology
#[derive(Debug, Error)]
pub enum StateError {
    #[error("duplicate environment: {0}")]
    DuplicateEnvironment(#[from] DuplicateSlot),

    #[error("version {0} not found")]
    VersionNotFound(String),

    #[error("version {0} failed processing and cannot be deployed")]
    VersionFailed(String),

    #[error("unparseable version: {0}")]
    UnparseableVersion(String),

    #[error("no {class} environments found for {application}")]
    NoEnvironments {
        application: String,
        class: EnvironmentClass,
    },

    #[error("planned environment {name} is already running in {class}")]
    NameCollision {
        name: String,
        class: EnvironmentClass,
    },

    #[error("control plane error: {0}")]
    ControlPlane(#[from] ControlPlaneError),
}

/// Result type for state operations
pub type Result<T> = std::result::Result<T, StateError>;
