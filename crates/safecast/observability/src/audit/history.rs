//! Per-environment history files
//!
//! Each (application, environment class) pair owns one JSON file holding an
//! array of records, newest first: `<root>/<app>/<env>.json`.

use super::sink::AuditSink;
use crate::error::Result;
use async_trait::async_trait;
use safecast_types::{AuditRecord, EnvironmentClass};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Appends records to per-environment JSON history files
pub struct HistoryFileSink {
    root: PathBuf,
}

impl HistoryFileSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn history_path(&self, app: &str, env: EnvironmentClass) -> PathBuf {
        self.root.join(app).join(format!("{env}.json"))
    }

    /// Entries of one history file, newest first.
    ///
    /// Entries are returned as raw JSON so that older record shapes survive.
    pub async fn read(&self, app: &str, env: EnvironmentClass) -> Result<Vec<serde_json::Value>> {
        read_history(&self.history_path(app, env)).await
    }

    async fn prepend(
        &self,
        app: &str,
        env: EnvironmentClass,
        records: &[&AuditRecord],
    ) -> Result<()> {
        let path = self.history_path(app, env);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let existing = read_history(&path).await?;
        let mut entries = Vec::with_capacity(existing.len() + records.len());
        for record in records.iter().rev() {
            entries.push(serde_json::to_value(record)?);
        }
        entries.extend(existing);

        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, serde_json::to_vec_pretty(&entries)?).await?;
        tokio::fs::rename(&tmp, &path).await?;

        debug!(
            path = %path.display(),
            added = records.len(),
            total = entries.len(),
            "Updated history"
        );
        Ok(())
    }
}

async fn read_history(path: &Path) -> Result<Vec<serde_json::Value>> {
    match tokio::fs::read(path).await {
        Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Vec::new()),
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e.into()),
    }
}

#[async_trait]
impl AuditSink for HistoryFileSink {
    async fn record(&self, record: &AuditRecord) -> Result<()> {
        self.prepend(record.app(), record.env(), &[record]).await
    }

    async fn record_batch(&self, records: &[AuditRecord]) -> Result<()> {
        let mut grouped: BTreeMap<(&str, EnvironmentClass), Vec<&AuditRecord>> = BTreeMap::new();
        for record in records {
            grouped
                .entry((record.app(), record.env()))
                .or_default()
                .push(record);
        }
        for ((app, env), records) in grouped {
            self.prepend(app, env, &records).await?;
        }
        Ok(())
    }
}
