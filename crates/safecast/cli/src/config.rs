//! CLI configuration

use crate::error::{CliError, CliResult};
use safecast_deployment::RolloutConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CliConfig {
    /// Control-plane gateway endpoint
    pub endpoint: Option<String>,

    /// Request timeout in seconds
    pub timeout_seconds: Option<u64>,

    /// Applications refreshed by `save-configs` when none is named
    pub applications: Option<Vec<String>>,

    /// Root directory of the per-environment deployment history
    pub audit_dir: Option<PathBuf>,

    /// Health wait and settle timings
    #[serde(default)]
    pub rollout: RolloutConfig,
}

impl CliConfig {
    /// Load configuration from file
    pub fn load(path: Option<&str>) -> CliResult<Self> {
        let config_path = match path {
            Some(p) => PathBuf::from(p),
            None => Self::default_config_path()?,
        };

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            let config: CliConfig =
                toml::from_str(&contents).map_err(|e| CliError::Config(e.to_string()))?;
            Ok(config)
        } else {
            Ok(CliConfig::default())
        }
    }

    /// Get the default configuration file path
    fn default_config_path() -> CliResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CliError::Config("Cannot find config directory".into()))?;
        Ok(config_dir.join("safecast-deploy").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_config() {
        let config = CliConfig::load(Some("/nonexistent/path/config.toml")).unwrap();
        assert!(config.endpoint.is_none());
        assert_eq!(config.rollout, RolloutConfig::default());
    }

    #[test]
    fn test_load_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
endpoint = "http://gateway:9000"
applications = ["api", "ingest"]
audit_dir = "/var/lib/safecast/history"

[rollout]
poll_interval_secs = 20
cname_settle_secs = 30

[rollout.source_links.repositories]
api = "safecastapi"
"#,
        )
        .unwrap();

        let config = CliConfig::load(path.to_str()).unwrap();
        assert_eq!(config.endpoint.as_deref(), Some("http://gateway:9000"));
        assert_eq!(config.applications.unwrap(), vec!["api", "ingest"]);
        assert_eq!(config.rollout.poll_interval_secs, 20);
        assert_eq!(config.rollout.health_timeout_secs, 540);
        assert_eq!(config.rollout.source_links.repositories.len(), 1);
    }

    #[test]
    fn test_invalid_config_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "rollout = 5").unwrap();
        assert!(matches!(
            CliConfig::load(path.to_str()),
            Err(CliError::Config(_))
        ));
    }
}
