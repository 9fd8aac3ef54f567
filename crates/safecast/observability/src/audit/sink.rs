//! Audit sinks for deployment and template records

use crate::error::{ObservabilityError, Result};
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use safecast_types::AuditRecord;
use std::io::Write;
use std::sync::Arc;

/// Trait for audit sinks
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Persist one record
    async fn record(&self, record: &AuditRecord) -> Result<()>;

    /// Persist a batch of records produced by one run
    async fn record_batch(&self, records: &[AuditRecord]) -> Result<()> {
        for record in records {
            self.record(record).await?;
        }
        Ok(())
    }
}

/// In-memory audit sink for testing
#[derive(Default)]
pub struct MemoryAuditSink {
    records: RwLock<Vec<AuditRecord>>,
    batches: RwLock<Vec<usize>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.read().clone()
    }

    /// Sizes of the batches received, in order
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batches.read().clone()
    }

    pub fn clear(&self) {
        self.records.write().clear();
        self.batches.write().clear();
    }
}

#[async_trait]
impl AuditSink for MemoryAuditSink {
    async fn record(&self, record: &AuditRecord) -> Result<()> {
        self.records.write().push(record.clone());
        Ok(())
    }

    async fn record_batch(&self, records: &[AuditRecord]) -> Result<()> {
        self.records.write().extend_from_slice(records);
        self.batches.write().push(records.len());
        Ok(())
    }
}

/// Pretty-prints records as JSON
pub struct StreamAuditSink {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl StreamAuditSink {
    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
        }
    }

    fn emit<T: serde::Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        let mut writer = self.writer.lock();
        serde_json::to_writer_pretty(&mut *writer, value)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}

#[async_trait]
impl AuditSink for StreamAuditSink {
    async fn record(&self, record: &AuditRecord) -> Result<()> {
        self.emit(record)
    }

    async fn record_batch(&self, records: &[AuditRecord]) -> Result<()> {
        self.emit(records)
    }
}

/// Composite sink that writes to multiple sinks
pub struct CompositeSink {
    sinks: Vec<Arc<dyn AuditSink>>,
}

impl CompositeSink {
    pub fn new(sinks: Vec<Arc<dyn AuditSink>>) -> Self {
        Self { sinks }
    }

    pub fn add(&mut self, sink: Arc<dyn AuditSink>) {
        self.sinks.push(sink);
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

#[async_trait]
impl AuditSink for CompositeSink {
    async fn record(&self, record: &AuditRecord) -> Result<()> {
        if self.sinks.is_empty() {
            return Err(ObservabilityError::Audit("No sinks configured".into()));
        }
        for sink in &self.sinks {
            sink.record(record).await?;
        }
        Ok(())
    }

    async fn record_batch(&self, records: &[AuditRecord]) -> Result<()> {
        if self.sinks.is_empty() {
            return Err(ObservabilityError::Audit("No sinks configured".into()));
        }
        for sink in &self.sinks {
            sink.record_batch(records).await?;
        }
        Ok(())
    }
}
