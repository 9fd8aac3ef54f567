//! CLI command implementations

pub mod deploy;
pub mod inspect;
pub mod templates;

use crate::config::CliConfig;
use safecast_control::ControlPlane;
use safecast_observability::AuditSink;
use std::sync::Arc;

/// Capabilities shared by every command
pub struct Services {
    pub control: Arc<dyn ControlPlane>,
    pub sink: Arc<dyn AuditSink>,
    pub config: CliConfig,
}
