//! Safecast Templates - Saved configuration template synchronization
//!
//! New environments are launched from saved configuration templates. Before
//! a blue-green rollout the templates are refreshed from the live tiers so
//! replacements inherit the current configuration. See
//! [`TemplateSynchronizer`].

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod error;
pub mod sync;

// Re-exports
pub use error::{Result, TemplateError};
pub use sync::{ConfigTemplateSync, TemplateScope, TemplateSynchronizer, DEFAULT_APPLICATIONS};
