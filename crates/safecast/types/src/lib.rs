//! Safecast Types - Core types for environment deployment orchestration
//!
//! Safecast applications run on a managed platform as a set of environments.
//! Each environment occupies one slot, identified by an environment class
//! (development or production) and a tier kind (web or worker). This crate
//! holds the value types every other crate in the workspace speaks:
//!
//! - **Naming**: environment names encode the slot and a rotation number
//! - **ParsedVersion**: version labels encode app, branch, build and commit
//! - **Tier**: one running environment in one slot
//! - **TopologySnapshot**: every tier of one application, keyed by slot
//! - **Records**: the audit artifacts produced by deployments and template syncs
//!
//! Everything here is pure. No I/O happens in this crate.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod environment;
pub mod naming;
pub mod record;
pub mod tier;
pub mod topology;
pub mod version;

// Re-export main types
pub use environment::{EnvironmentClass, ParseEnumError, TierKind};
pub use naming::{
    format_environment_name, parse_environment_name, template_name, EnvironmentSlot, Rotation,
    UnrecognizedName,
};
pub use record::{
    AuditRecord, DeploymentEvent, DeploymentRecord, SourceLinks, TemplateSyncRecord, TierChange,
};
pub use tier::Tier;
pub use topology::{DuplicateSlot, TopologySnapshot};
pub use version::{ParsedVersion, VersionError};
