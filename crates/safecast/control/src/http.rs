//! HTTP client for a control-plane gateway
//!
//! The gateway exposes the platform's environment API as JSON over HTTP.
//! Every call maps to exactly one request; there are no client-side retries.

use crate::client::{
    ApplicationVersion, ControlPlane, CreateEnvironment, EnvironmentDescription,
    EnvironmentUpdate, HealthStatus,
};
use crate::error::{ControlPlaneError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// JSON control-plane client
pub struct HttpControlPlane {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    health_status: HealthStatus,
}

#[derive(Debug, Serialize)]
struct SwapCnamesRequest<'a> {
    source_environment_name: &'a str,
    destination_environment_name: &'a str,
}

#[derive(Debug, Serialize)]
struct CreateTemplateRequest<'a> {
    template_name: &'a str,
    environment_id: &'a str,
}

impl HttpControlPlane {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: endpoint.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ========== Internal HTTP helpers ==========

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "GET");
        let response = self.client.get(&url).send().await?;
        Self::json(response).await
    }

    async fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<()> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "POST");
        let response = self.client.post(&url).json(body).send().await?;
        Self::empty(response).await
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "DELETE");
        let response = self.client.delete(&url).send().await?;
        Self::empty(response).await
    }

    async fn json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }

    async fn empty(response: reqwest::Response) -> Result<()> {
        Self::check(response).await.map(|_| ())
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();

        if status.is_success() {
            Ok(response)
        } else if status == StatusCode::NOT_FOUND {
            Err(ControlPlaneError::NotFound(response.url().path().to_string()))
        } else {
            let message = response.text().await.unwrap_or_default();
            Err(ControlPlaneError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[async_trait]
impl ControlPlane for HttpControlPlane {
    async fn list_environments(&self, application: &str) -> Result<Vec<EnvironmentDescription>> {
        self.get(&format!(
            "/api/v1/applications/{application}/environments?include_deleted=false"
        ))
        .await
    }

    async fn list_application_versions(
        &self,
        application: &str,
    ) -> Result<Vec<ApplicationVersion>> {
        self.get(&format!("/api/v1/applications/{application}/versions"))
            .await
    }

    async fn create_environment(&self, request: &CreateEnvironment) -> Result<()> {
        self.post(
            &format!("/api/v1/applications/{}/environments", request.application),
            request,
        )
        .await
    }

    async fn update_environment(
        &self,
        application: &str,
        name: &str,
        update: &EnvironmentUpdate,
    ) -> Result<()> {
        self.post(
            &format!("/api/v1/applications/{application}/environments/{name}/update"),
            update,
        )
        .await
    }

    async fn describe_environment_health(&self, name: &str) -> Result<HealthStatus> {
        let response: HealthResponse = self
            .get(&format!("/api/v1/environments/{name}/health"))
            .await?;
        Ok(response.health_status)
    }

    async fn swap_environment_cnames(&self, source: &str, destination: &str) -> Result<()> {
        self.post(
            "/api/v1/environments/swap-cnames",
            &SwapCnamesRequest {
                source_environment_name: source,
                destination_environment_name: destination,
            },
        )
        .await
    }

    async fn terminate_environment(&self, name: &str) -> Result<()> {
        self.delete(&format!("/api/v1/environments/{name}")).await
    }

    async fn delete_configuration_template(
        &self,
        application: &str,
        template: &str,
    ) -> Result<()> {
        self.delete(&format!(
            "/api/v1/applications/{application}/templates/{template}"
        ))
        .await
    }

    async fn create_configuration_template(
        &self,
        application: &str,
        template: &str,
        source_environment_id: &str,
    ) -> Result<()> {
        self.post(
            &format!("/api/v1/applications/{application}/templates"),
            &CreateTemplateRequest {
                template_name: template,
                environment_id: source_environment_id,
            },
        )
        .await
    }

    async fn describe_configuration_template(
        &self,
        application: &str,
        template: &str,
    ) -> Result<serde_json::Value> {
        self.get(&format!(
            "/api/v1/applications/{application}/templates/{template}"
        ))
        .await
    }

    async fn list_platform_versions(&self, language: &str) -> Result<Vec<String>> {
        self.get(&format!(
            "/api/v1/platforms?language={language}&lifecycle=recommended"
        ))
        .await
    }
}
