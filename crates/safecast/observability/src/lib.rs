//! Safecast Observability
//!
//! Audit sinks for the records produced by deployments and template syncs.
//!
//! ## Sinks
//!
//! - **Memory**: keeps records in process, for tests and dry runs
//! - **Stream**: pretty-prints records as JSON to any writer
//! - **History file**: per-environment JSON history, newest entry first
//! - **Composite**: fans a record out to several sinks in order

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod audit;
pub mod error;

pub use audit::{AuditSink, CompositeSink, HistoryFileSink, MemoryAuditSink, StreamAuditSink};
pub use error::{ObservabilityError, Result};
