//! Safecast State - What is running, and what should run next
//!
//! This crate turns control-plane answers into a [`TopologySnapshot`] and
//! derives the next snapshot from a deployment request:
//!
//! - [`discover`]: groups live environments by slot and classifies versions
//! - [`VersionCatalog`]: available and failed versions, oldest first
//! - [`plan`]: pure planner for in-place and blue-green rollouts
//!
//! [`TopologySnapshot`]: safecast_types::TopologySnapshot

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod catalog;
pub mod discovery;
pub mod error;
pub mod planner;

// Re-exports
pub use catalog::VersionCatalog;
pub use discovery::{discover, DiscoveredState};
pub use error::{Result, StateError};
pub use planner::{plan, PlanRequest};
