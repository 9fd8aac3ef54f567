//! Rollout strategy implementations

pub mod executor;
pub mod new_env;
pub mod same_env;

pub use executor::RolloutExecutor;
pub use new_env::{BlueGreenExecutor, NewEnvPhase};
pub use same_env::{InPlaceUpdateExecutor, SameEnvPhase};

use crate::manager::RolloutStrategy;
use safecast_templates::ConfigTemplateSync;
use std::sync::Arc;

/// Factory for creating rollout executors
pub fn create_executor(
    strategy: &RolloutStrategy,
    templates: Arc<dyn ConfigTemplateSync>,
) -> Arc<dyn RolloutExecutor> {
    match strategy {
        RolloutStrategy::InPlace { .. } => Arc::new(InPlaceUpdateExecutor::new()),
        RolloutStrategy::BlueGreen { sync_templates, .. } => {
            let executor = BlueGreenExecutor::new();
            if *sync_templates {
                Arc::new(executor.with_templates(templates))
            } else {
                Arc::new(executor)
            }
        }
    }
}
