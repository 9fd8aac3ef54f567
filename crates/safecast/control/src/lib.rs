//! Safecast Control - Control-plane client capability
//!
//! Everything the orchestration crates learn about or change on the
//! platform goes through the [`ControlPlane`] trait. Callers receive it as
//! an `Arc<dyn ControlPlane>` and never look a client up from ambient state.
//!
//! Two implementations ship with the crate:
//!
//! - [`HttpControlPlane`]: JSON client for a control-plane gateway
//! - [`InMemoryControlPlane`]: scriptable stand-in that journals every call,
//!   used by development setups and every test suite in the workspace

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod client;
pub mod error;
pub mod http;
pub mod memory;

// Re-exports
pub use client::{
    ApplicationVersion, ControlPlane, CreateEnvironment, EnvironmentDescription,
    EnvironmentUpdate, HealthStatus, VersionStatus,
};
pub use error::{ControlPlaneError, Result};
pub use http::HttpControlPlane;
pub use memory::{ControlPlaneCall, InMemoryControlPlane};
