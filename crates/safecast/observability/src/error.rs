//! Observability error types

use thiserror::Error;

/// Errors raised by audit sinks
#[derive(Debug, Error)]
pub enum ObservabilityError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("audit error: {0}")]
    Audit(String),
}

/// Result type for observability operations
pub type Result<T> = std::result::Result<T, ObservabilityError>;
