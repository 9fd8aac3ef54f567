//! Control-plane error types

use thiserror::Error;

/// Errors surfaced by control-plane calls
#[derive(Debug, Error)]
pub enum ControlPlaneError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{operation} rejected: {reason}")]
    Rejected { operation: String, reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ControlPlaneError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ControlPlaneError::NotFound(_))
    }
}

/// Result type for control-plane operations
pub type Result<T> = std::result::Result<T, ControlPlaneError>;
