//! Audit records
//!
//! A deployment produces one [`DeploymentRecord`]; a template sync produces
//! one [`TemplateSyncRecord`] per tier it refreshed. Both are handed to an
//! audit sink as [`AuditRecord`]s.

use crate::environment::{EnvironmentClass, TierKind};
use crate::tier::Tier;
use crate::version::ParsedVersion;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kind of deployment that produced a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentEvent {
    /// New version deployed onto the running environments
    SameEnvironment,
    /// Replacement environments created and cut over
    NewEnvironment,
}

/// Before/after state of one tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierChange {
    pub old_env: String,
    pub new_env: String,
    pub old_version: Option<String>,
    pub new_version: Option<String>,
    pub old_version_parsed: Option<ParsedVersion>,
    pub new_version_parsed: Option<ParsedVersion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_diff: Option<String>,
}

impl TierChange {
    pub fn between(old: &Tier, new: &Tier, application: &str, links: &SourceLinks) -> Self {
        let github_diff = match (old.git_commit(), new.git_commit()) {
            (Some(from), Some(to)) => Some(links.compare_url(application, from, to)),
            _ => None,
        };

        Self {
            old_env: old.name.clone(),
            new_env: new.name.clone(),
            old_version: old.version_label.clone(),
            new_version: new.version_label.clone(),
            old_version_parsed: old.parsed_version.clone(),
            new_version_parsed: new.parsed_version.clone(),
            github_diff,
        }
    }
}

/// Audit artifact of one deployment run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    pub app: String,
    pub env: EnvironmentClass,
    pub event: DeploymentEvent,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    /// Seconds between start and completion
    pub elapsed_time: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web: Option<TierChange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wrk: Option<TierChange>,
}

impl DeploymentRecord {
    /// Start a record; tier sections are added as tiers complete.
    pub fn started(app: impl Into<String>, env: EnvironmentClass, event: DeploymentEvent) -> Self {
        let now = Utc::now();
        Self {
            app: app.into(),
            env,
            event,
            started_at: now,
            completed_at: now,
            elapsed_time: 0.0,
            web: None,
            wrk: None,
        }
    }

    pub fn set_tier(&mut self, kind: TierKind, change: TierChange) {
        match kind {
            TierKind::Web => self.web = Some(change),
            TierKind::Worker => self.wrk = Some(change),
        }
    }

    pub fn tier(&self, kind: TierKind) -> Option<&TierChange> {
        match kind {
            TierKind::Web => self.web.as_ref(),
            TierKind::Worker => self.wrk.as_ref(),
        }
    }

    pub fn complete(mut self) -> Self {
        self.completed_at = Utc::now();
        self.elapsed_time = elapsed_seconds(self.started_at, self.completed_at);
        self
    }
}

/// Audit entry for one refreshed configuration template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateSyncRecord {
    pub app: String,
    pub env: EnvironmentClass,
    /// Always `save_configs`
    pub event: String,
    pub role: TierKind,
    pub template_name: String,
    pub source_env_id: Option<String>,
    pub source_env_name: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub elapsed_time: f64,
}

impl TemplateSyncRecord {
    pub const EVENT: &'static str = "save_configs";

    pub fn new(
        source: &Tier,
        app: impl Into<String>,
        template_name: impl Into<String>,
        started_at: DateTime<Utc>,
    ) -> Self {
        let completed_at = Utc::now();
        Self {
            app: app.into(),
            env: source.class,
            event: Self::EVENT.to_string(),
            role: source.kind,
            template_name: template_name.into(),
            source_env_id: source.resource_id.clone(),
            source_env_name: source.name.clone(),
            started_at,
            completed_at,
            elapsed_time: elapsed_seconds(started_at, completed_at),
        }
    }
}

/// Anything an audit sink accepts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AuditRecord {
    Deployment(DeploymentRecord),
    TemplateSync(TemplateSyncRecord),
}

impl AuditRecord {
    pub fn app(&self) -> &str {
        match self {
            AuditRecord::Deployment(r) => &r.app,
            AuditRecord::TemplateSync(r) => &r.app,
        }
    }

    pub fn env(&self) -> EnvironmentClass {
        match self {
            AuditRecord::Deployment(r) => r.env,
            AuditRecord::TemplateSync(r) => r.env,
        }
    }
}

impl From<DeploymentRecord> for AuditRecord {
    fn from(record: DeploymentRecord) -> Self {
        AuditRecord::Deployment(record)
    }
}

impl From<TemplateSyncRecord> for AuditRecord {
    fn from(record: TemplateSyncRecord) -> Self {
        AuditRecord::TemplateSync(record)
    }
}

/// Where application sources live, for commit comparison links
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLinks {
    #[serde(default = "default_source_base")]
    pub base_url: String,
    /// Application name to repository name; unlisted apps use their own name
    #[serde(default = "default_repositories")]
    pub repositories: BTreeMap<String, String>,
}

impl Default for SourceLinks {
    fn default() -> Self {
        Self {
            base_url: default_source_base(),
            repositories: default_repositories(),
        }
    }
}

impl SourceLinks {
    pub fn compare_url(&self, application: &str, from: &str, to: &str) -> String {
        let repo = self
            .repositories
            .get(application)
            .map(String::as_str)
            .unwrap_or(application);
        format!(
            "{}/{}/compare/{}...{}",
            self.base_url.trim_end_matches('/'),
            repo,
            from,
            to
        )
    }
}

fn default_source_base() -> String {
    "https://github.com/Safecast".to_string()
}

fn default_repositories() -> BTreeMap<String, String> {
    [("api", "safecastapi"), ("ingest", "ingest"), ("reporting", "reporting")]
        .into_iter()
        .map(|(app, repo)| (app.to_string(), repo.to_string()))
        .collect()
}

fn elapsed_seconds(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    (end - start).num_milliseconds() as f64 / 1000.0
}
