//! Safecast Deployment - Rollout orchestration
//!
//! Drives a planned topology onto the control plane, one tier at a time and
//! always worker before web.
//!
//! ## Strategies
//!
//! - **In place**: deploys a new version onto the running environments
//! - **Blue-green**: launches replacement environments at the next rotation,
//!   swaps CNAMEs and terminates the originals
//!
//! Both gate every tier on a bounded health wait. Nothing is rolled back on
//! failure: the fleet is left as the last successful step produced it.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod config;
pub mod context;
pub mod error;
pub mod health;
pub mod manager;
pub mod strategies;

// Re-exports
pub use config::RolloutConfig;
pub use context::RolloutContext;
pub use error::{DeploymentError, Result};
pub use health::HealthWaiter;
pub use manager::{DeploymentManager, DeploymentRequest, RolloutStrategy};
pub use strategies::{
    create_executor, BlueGreenExecutor, InPlaceUpdateExecutor, NewEnvPhase, RolloutExecutor,
    SameEnvPhase,
};
