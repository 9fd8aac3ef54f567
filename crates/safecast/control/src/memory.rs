//! In-memory control plane
//!
//! Holds environments, versions and templates in process. Health can be
//! scripted per environment name, calls are journaled in order, and any
//! operation can be made to fail once.

use crate::client::{
    ApplicationVersion, ControlPlane, CreateEnvironment, EnvironmentDescription,
    EnvironmentUpdate, HealthStatus, VersionStatus,
};
use crate::error::{ControlPlaneError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, VecDeque};
use tracing::debug;

/// One call received by the in-memory control plane
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlPlaneCall {
    ListEnvironments { application: String },
    ListApplicationVersions { application: String },
    CreateEnvironment(CreateEnvironment),
    UpdateEnvironment {
        application: String,
        name: String,
        update: EnvironmentUpdate,
    },
    DescribeEnvironmentHealth { name: String },
    SwapEnvironmentCnames { source: String, destination: String },
    TerminateEnvironment { name: String },
    DeleteConfigurationTemplate { application: String, template: String },
    CreateConfigurationTemplate {
        application: String,
        template: String,
        source_environment_id: String,
    },
    DescribeConfigurationTemplate { application: String, template: String },
    ListPlatformVersions { language: String },
}

impl ControlPlaneCall {
    /// True for calls that change platform state
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            ControlPlaneCall::CreateEnvironment(_)
                | ControlPlaneCall::UpdateEnvironment { .. }
                | ControlPlaneCall::SwapEnvironmentCnames { .. }
                | ControlPlaneCall::TerminateEnvironment { .. }
                | ControlPlaneCall::DeleteConfigurationTemplate { .. }
                | ControlPlaneCall::CreateConfigurationTemplate { .. }
        )
    }
}

#[derive(Debug, Clone)]
struct StoredEnvironment {
    application: String,
    description: EnvironmentDescription,
    scaling: Option<(u32, u32)>,
    cname: String,
}

#[derive(Debug, Clone)]
struct StoredTemplate {
    source_environment_id: Option<String>,
    settings: serde_json::Value,
}

/// In-memory control plane for development and tests
#[derive(Default)]
pub struct InMemoryControlPlane {
    environments: RwLock<Vec<StoredEnvironment>>,
    versions: RwLock<HashMap<String, Vec<ApplicationVersion>>>,
    templates: RwLock<HashMap<(String, String), StoredTemplate>>,
    platforms: RwLock<HashMap<String, Vec<String>>>,
    health: Mutex<HashMap<String, VecDeque<HealthStatus>>>,
    failures: Mutex<HashMap<&'static str, String>>,
    calls: Mutex<Vec<ControlPlaneCall>>,
}

impl InMemoryControlPlane {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a running environment and return its resource id.
    pub fn add_environment(
        &self,
        application: &str,
        name: &str,
        platform_arn: &str,
        version_label: Option<&str>,
    ) -> String {
        let environment_id = new_environment_id();
        self.environments.write().push(StoredEnvironment {
            application: application.to_string(),
            description: EnvironmentDescription {
                name: name.to_string(),
                environment_id: environment_id.clone(),
                platform_arn: platform_arn.to_string(),
                version_label: version_label.map(str::to_string),
            },
            scaling: None,
            cname: format!("{name}.elasticbeanstalk.com"),
        });
        environment_id
    }

    pub fn add_version(
        &self,
        application: &str,
        version_label: &str,
        updated_at: DateTime<Utc>,
        status: VersionStatus,
    ) {
        self.versions
            .write()
            .entry(application.to_string())
            .or_default()
            .push(ApplicationVersion {
                version_label: version_label.to_string(),
                updated_at,
                status,
            });
    }

    pub fn add_template(&self, application: &str, template: &str, settings: serde_json::Value) {
        self.templates.write().insert(
            (application.to_string(), template.to_string()),
            StoredTemplate {
                source_environment_id: None,
                settings,
            },
        );
    }

    pub fn add_platform(&self, language: &str, platform_arn: &str) {
        self.platforms
            .write()
            .entry(language.to_string())
            .or_default()
            .push(platform_arn.to_string());
    }

    /// Queue health answers for an environment name.
    ///
    /// Answers are consumed one per poll; the last one repeats forever.
    /// Unscripted environments that exist report `Ok`.
    pub fn script_health(&self, name: &str, statuses: impl IntoIterator<Item = HealthStatus>) {
        self.health
            .lock()
            .insert(name.to_string(), statuses.into_iter().collect());
    }

    /// Make the next call of `operation` fail with a rejection.
    pub fn fail_next(&self, operation: &'static str, reason: &str) {
        self.failures.lock().insert(operation, reason.to_string());
    }

    pub fn calls(&self) -> Vec<ControlPlaneCall> {
        self.calls.lock().clone()
    }

    pub fn mutations(&self) -> Vec<ControlPlaneCall> {
        self.calls().into_iter().filter(|c| c.is_mutation()).collect()
    }

    pub fn environment(&self, name: &str) -> Option<EnvironmentDescription> {
        self.environments
            .read()
            .iter()
            .find(|e| e.description.name == name)
            .map(|e| e.description.clone())
    }

    pub fn scaling_bounds(&self, name: &str) -> Option<(u32, u32)> {
        self.environments
            .read()
            .iter()
            .find(|e| e.description.name == name)
            .and_then(|e| e.scaling)
    }

    pub fn cname(&self, name: &str) -> Option<String> {
        self.environments
            .read()
            .iter()
            .find(|e| e.description.name == name)
            .map(|e| e.cname.clone())
    }

    pub fn template_source(&self, application: &str, template: &str) -> Option<String> {
        self.templates
            .read()
            .get(&(application.to_string(), template.to_string()))
            .and_then(|t| t.source_environment_id.clone())
    }

    // --- Internal helpers ---

    fn record(&self, call: ControlPlaneCall) {
        debug!(?call, "control plane call");
        self.calls.lock().push(call);
    }

    fn check_failure(&self, operation: &'static str) -> Result<()> {
        match self.failures.lock().remove(operation) {
            Some(reason) => Err(ControlPlaneError::Rejected {
                operation: operation.to_string(),
                reason,
            }),
            None => Ok(()),
        }
    }

    fn exists(&self, name: &str) -> bool {
        self.environments
            .read()
            .iter()
            .any(|e| e.description.name == name)
    }
}

#[async_trait]
impl ControlPlane for InMemoryControlPlane {
    async fn list_environments(&self, application: &str) -> Result<Vec<EnvironmentDescription>> {
        self.record(ControlPlaneCall::ListEnvironments {
            application: application.to_string(),
        });
        self.check_failure("list_environments")?;

        Ok(self
            .environments
            .read()
            .iter()
            .filter(|e| e.application == application)
            .map(|e| e.description.clone())
            .collect())
    }

    async fn list_application_versions(
        &self,
        application: &str,
    ) -> Result<Vec<ApplicationVersion>> {
        self.record(ControlPlaneCall::ListApplicationVersions {
            application: application.to_string(),
        });
        self.check_failure("list_application_versions")?;

        Ok(self
            .versions
            .read()
            .get(application)
            .cloned()
            .unwrap_or_default())
    }

    async fn create_environment(&self, request: &CreateEnvironment) -> Result<()> {
        self.record(ControlPlaneCall::CreateEnvironment(request.clone()));
        self.check_failure("create_environment")?;

        if self.exists(&request.name) {
            return Err(ControlPlaneError::Rejected {
                operation: "create_environment".into(),
                reason: format!("environment {} already exists", request.name),
            });
        }
        self.add_environment(
            &request.application,
            &request.name,
            &request.platform_arn,
            request.version_label.as_deref(),
        );
        Ok(())
    }

    async fn update_environment(
        &self,
        application: &str,
        name: &str,
        update: &EnvironmentUpdate,
    ) -> Result<()> {
        self.record(ControlPlaneCall::UpdateEnvironment {
            application: application.to_string(),
            name: name.to_string(),
            update: update.clone(),
        });
        self.check_failure("update_environment")?;

        let mut environments = self.environments.write();
        let env = environments
            .iter_mut()
            .find(|e| e.application == application && e.description.name == name)
            .ok_or_else(|| ControlPlaneError::NotFound(name.to_string()))?;

        match update {
            EnvironmentUpdate::Version { version_label } => {
                env.description.version_label = Some(version_label.clone());
            }
            EnvironmentUpdate::ScalingBounds { min_size, max_size } => {
                env.scaling = Some((*min_size, *max_size));
            }
        }
        Ok(())
    }

    async fn describe_environment_health(&self, name: &str) -> Result<HealthStatus> {
        self.record(ControlPlaneCall::DescribeEnvironmentHealth {
            name: name.to_string(),
        });
        self.check_failure("describe_environment_health")?;

        if let Some(queue) = self.health.lock().get_mut(name) {
            let status = if queue.len() > 1 {
                queue.pop_front()
            } else {
                queue.front().copied()
            };
            if let Some(status) = status {
                return Ok(status);
            }
        }

        if self.exists(name) {
            Ok(HealthStatus::Ok)
        } else {
            Err(ControlPlaneError::NotFound(name.to_string()))
        }
    }

    async fn swap_environment_cnames(&self, source: &str, destination: &str) -> Result<()> {
        self.record(ControlPlaneCall::SwapEnvironmentCnames {
            source: source.to_string(),
            destination: destination.to_string(),
        });
        self.check_failure("swap_environment_cnames")?;

        let mut environments = self.environments.write();
        let source_idx = environments
            .iter()
            .position(|e| e.description.name == source)
            .ok_or_else(|| ControlPlaneError::NotFound(source.to_string()))?;
        let destination_idx = environments
            .iter()
            .position(|e| e.description.name == destination)
            .ok_or_else(|| ControlPlaneError::NotFound(destination.to_string()))?;

        let source_cname = environments[source_idx].cname.clone();
        environments[source_idx].cname =
            std::mem::replace(&mut environments[destination_idx].cname, source_cname);
        Ok(())
    }

    async fn terminate_environment(&self, name: &str) -> Result<()> {
        self.record(ControlPlaneCall::TerminateEnvironment {
            name: name.to_string(),
        });
        self.check_failure("terminate_environment")?;

        let mut environments = self.environments.write();
        let before = environments.len();
        environments.retain(|e| e.description.name != name);
        if environments.len() == before {
            return Err(ControlPlaneError::NotFound(name.to_string()));
        }
        Ok(())
    }

    async fn delete_configuration_template(
        &self,
        application: &str,
        template: &str,
    ) -> Result<()> {
        self.record(ControlPlaneCall::DeleteConfigurationTemplate {
            application: application.to_string(),
            template: template.to_string(),
        });
        self.check_failure("delete_configuration_template")?;

        self.templates
            .write()
            .remove(&(application.to_string(), template.to_string()))
            .map(|_| ())
            .ok_or_else(|| ControlPlaneError::NotFound(format!("{application}/{template}")))
    }

    async fn create_configuration_template(
        &self,
        application: &str,
        template: &str,
        source_environment_id: &str,
    ) -> Result<()> {
        self.record(ControlPlaneCall::CreateConfigurationTemplate {
            application: application.to_string(),
            template: template.to_string(),
            source_environment_id: source_environment_id.to_string(),
        });
        self.check_failure("create_configuration_template")?;

        let source = self
            .environments
            .read()
            .iter()
            .find(|e| e.description.environment_id == source_environment_id)
            .map(|e| e.description.clone())
            .ok_or_else(|| ControlPlaneError::NotFound(source_environment_id.to_string()))?;

        let mut templates = self.templates.write();
        let key = (application.to_string(), template.to_string());
        if templates.contains_key(&key) {
            return Err(ControlPlaneError::Rejected {
                operation: "create_configuration_template".into(),
                reason: format!("template {template} already exists"),
            });
        }
        templates.insert(
            key,
            StoredTemplate {
                source_environment_id: Some(source_environment_id.to_string()),
                settings: serde_json::json!({
                    "SolutionStack": source.platform_arn,
                    "SourceEnvironment": source.name,
                }),
            },
        );
        Ok(())
    }

    async fn describe_configuration_template(
        &self,
        application: &str,
        template: &str,
    ) -> Result<serde_json::Value> {
        self.record(ControlPlaneCall::DescribeConfigurationTemplate {
            application: application.to_string(),
            template: template.to_string(),
        });
        self.check_failure("describe_configuration_template")?;

        self.templates
            .read()
            .get(&(application.to_string(), template.to_string()))
            .map(|t| t.settings.clone())
            .ok_or_else(|| ControlPlaneError::NotFound(format!("{application}/{template}")))
    }

    async fn list_platform_versions(&self, language: &str) -> Result<Vec<String>> {
        self.record(ControlPlaneCall::ListPlatformVersions {
            language: language.to_string(),
        });
        self.check_failure("list_platform_versions")?;

        let mut arns = self
            .platforms
            .read()
            .get(language)
            .cloned()
            .unwrap_or_default();
        arns.sort();
        Ok(arns)
    }
}

fn new_environment_id() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("e-{}", &id[..10])
}
