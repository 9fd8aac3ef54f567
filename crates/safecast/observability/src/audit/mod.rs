//! Audit trail of deployments and template syncs
//!
//! Records are built by the orchestration crates; sinks only persist them.

pub mod history;
pub mod sink;

pub use history::HistoryFileSink;
pub use sink::{AuditSink, CompositeSink, MemoryAuditSink, StreamAuditSink};
