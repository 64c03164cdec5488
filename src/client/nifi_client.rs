//! # NiFi API Client
//!
//! HTTP implementation of [`FlowApi`] against the NiFi REST API (`/nifi-api`).
//! Handles base-URL joining, optional username/password token login and the
//! mapping of non-success responses to [`DeployError::Api`].

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use std::time::Duration;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::client::traits::FlowApi;
use crate::config::NifiApiConfig;
use crate::constants::api_paths;
use crate::error::{DeployError, Result};
use crate::models::{
    ConnectionEntity, ControllerServiceEntity, ControllerServicesEntity, FlowEntity,
    InstantiateTemplateRequest, Position, ProcessGroupEntity, ProcessGroupFlowEntity,
    ProcessorEntity, ProcessorState, ProcessorStateUpdate, Revision, ScheduleComponentsEntity,
    ScheduledState, TemplateEntity, TemplatesEntity,
};
use crate::utils::template_xml;

/// HTTP client for a single NiFi instance
#[derive(Clone)]
pub struct NifiApiClient {
    client: Client,
    config: NifiApiConfig,
    base_url: Url,
    client_id: String,
    token: Option<String>,
}

impl std::fmt::Debug for NifiApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NifiApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("timeout_ms", &self.config.timeout_ms)
            .field("client_id", &self.client_id)
            .field("authenticated", &self.token.is_some())
            .finish()
    }
}

impl NifiApiClient {
    /// Create a client without authenticating
    pub fn new(config: NifiApiConfig) -> Result<Self> {
        // Url::join drops the last segment unless the base ends with a slash
        let mut normalized = config.base_url.trim().to_string();
        if !normalized.ends_with('/') {
            normalized.push('/');
        }
        let base_url = Url::parse(&normalized)
            .map_err(|e| DeployError::config_error(format!("Invalid base URL: {e}")))?;

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .user_agent(format!("nifi-deploy/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DeployError::config_error(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            config,
            base_url,
            client_id: Uuid::new_v4().to_string(),
            token: None,
        })
    }

    /// Create a client and log in when credentials are configured
    pub async fn connect(config: NifiApiConfig) -> Result<Self> {
        let mut client = Self::new(config)?;
        if client.config.has_credentials() {
            client.authenticate().await?;
        }

        info!(
            base_url = %client.base_url,
            timeout_ms = client.config.timeout_ms,
            authenticated = client.token.is_some(),
            "Created NiFi API client"
        );
        Ok(client)
    }

    /// Exchange the configured username/password for a bearer token
    pub async fn authenticate(&mut self) -> Result<()> {
        let (Some(username), Some(password)) = (&self.config.username, &self.config.password)
        else {
            return Err(DeployError::config_error(
                "Authentication requires both username and password",
            ));
        };

        let url = self.url(api_paths::ACCESS_TOKEN)?;
        let response = self
            .client
            .post(url)
            .form(&[("username", username.as_str()), ("password", password.as_str())])
            .send()
            .await?;

        let token = Self::handle_text(response, "access token").await?;
        debug!(username = %username, "Obtained NiFi access token");
        self.token = Some(token.trim().to_string());
        Ok(())
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Client id presented with revisions this client creates
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| DeployError::config_error(format!("Failed to construct URL: {e}")))
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self.url(path)?;
        debug!(method = %method, url = %url, "NiFi request");

        let builder = self.client.request(method, url);
        Ok(match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    /// Handle HTTP response with proper error handling and deserialization
    async fn handle_response<T>(response: Response, operation: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let response = Self::check_status(response, operation).await?;
        let result = response.json::<T>().await.map_err(|e| {
            DeployError::config_error(format!("Failed to parse {operation} response: {e}"))
        })?;
        debug!("Successfully completed operation: {}", operation);
        Ok(result)
    }

    async fn handle_text(response: Response, operation: &str) -> Result<String> {
        let response = Self::check_status(response, operation).await?;
        Ok(response.text().await?)
    }

    async fn handle_empty(response: Response, operation: &str) -> Result<()> {
        Self::check_status(response, operation).await?;
        debug!("Successfully completed operation: {}", operation);
        Ok(())
    }

    async fn check_status(response: Response, operation: &str) -> Result<Response> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        error!(status = %status, error = %error_text, "Failed operation: {}", operation);
        Err(DeployError::api_error(status.as_u16(), error_text))
    }
}

#[async_trait]
impl FlowApi for NifiApiClient {
    async fn get_flow(&self, group_id: &str) -> Result<ProcessGroupFlowEntity> {
        let path = format!("{}/{group_id}", api_paths::FLOW_PROCESS_GROUPS);
        let response = self.request(Method::GET, &path)?.send().await?;
        Self::handle_response(response, "get flow").await
    }

    async fn get_process_group(&self, group_id: &str) -> Result<ProcessGroupEntity> {
        let path = format!("{}/{group_id}", api_paths::PROCESS_GROUPS);
        let response = self.request(Method::GET, &path)?.send().await?;
        Self::handle_response(response, "get process group").await
    }

    async fn create_process_group(
        &self,
        parent_id: &str,
        name: &str,
        position: Position,
    ) -> Result<ProcessGroupEntity> {
        let path = format!("{}/{parent_id}/process-groups", api_paths::PROCESS_GROUPS);
        let body = ProcessGroupEntity::new_child(name, position, self.client_id.clone());
        let response = self.request(Method::POST, &path)?.json(&body).send().await?;
        Self::handle_response(response, "create process group").await
    }

    async fn remove_process_group(&self, group_id: &str, revision: &Revision) -> Result<()> {
        let path = format!("{}/{group_id}", api_paths::PROCESS_GROUPS);
        let client_id = revision
            .client_id
            .clone()
            .unwrap_or_else(|| self.client_id.clone());
        let response = self
            .request(Method::DELETE, &path)?
            .query(&[
                ("version", revision.version.to_string()),
                ("clientId", client_id),
            ])
            .send()
            .await?;
        Self::handle_empty(response, "remove process group").await
    }

    async fn schedule_components(&self, group_id: &str, state: ScheduledState) -> Result<()> {
        let path = format!("{}/{group_id}", api_paths::FLOW_PROCESS_GROUPS);
        let body = ScheduleComponentsEntity {
            id: group_id.to_string(),
            state,
        };
        let response = self.request(Method::PUT, &path)?.json(&body).send().await?;
        Self::handle_empty(response, "schedule components").await
    }

    async fn get_processor(&self, processor_id: &str) -> Result<ProcessorEntity> {
        let path = format!("{}/{processor_id}", api_paths::PROCESSORS);
        let response = self.request(Method::GET, &path)?.send().await?;
        Self::handle_response(response, "get processor").await
    }

    async fn update_processor_state(
        &self,
        processor_id: &str,
        revision: &Revision,
        state: ProcessorState,
    ) -> Result<ProcessorEntity> {
        let path = format!("{}/{processor_id}", api_paths::PROCESSORS);
        let body = ProcessorStateUpdate::new(processor_id, revision.clone(), state);
        let response = self.request(Method::PUT, &path)?.json(&body).send().await?;
        Self::handle_response(response, "update processor state").await
    }

    async fn update_processor(&self, processor: &ProcessorEntity) -> Result<ProcessorEntity> {
        let path = format!("{}/{}", api_paths::PROCESSORS, processor.id);
        let response = self
            .request(Method::PUT, &path)?
            .json(processor)
            .send()
            .await?;
        Self::handle_response(response, "update processor").await
    }

    async fn get_controller_services(&self, group_id: &str) -> Result<Vec<ControllerServiceEntity>> {
        let path = format!(
            "{}/{group_id}/controller-services",
            api_paths::FLOW_PROCESS_GROUPS
        );
        let response = self.request(Method::GET, &path)?.send().await?;
        let services: ControllerServicesEntity =
            Self::handle_response(response, "get controller services").await?;
        Ok(services.controller_services)
    }

    async fn upload_template(
        &self,
        group_id: &str,
        file_name: &str,
        content: Vec<u8>,
    ) -> Result<TemplateEntity> {
        let path = format!("{}/{group_id}/templates/upload", api_paths::PROCESS_GROUPS);
        let part = Part::bytes(content)
            .file_name(file_name.to_string())
            .mime_str("application/xml")?;
        let form = Form::new().part("template", part);

        let response = self
            .request(Method::POST, &path)?
            .multipart(form)
            .send()
            .await?;
        // The upload endpoint only produces XML
        let body = Self::handle_text(response, "upload template").await?;
        template_xml::parse_template_entity(&body)
    }

    async fn instantiate_template(
        &self,
        group_id: &str,
        template_id: &str,
        origin: Position,
    ) -> Result<FlowEntity> {
        let path = format!("{}/{group_id}/template-instance", api_paths::PROCESS_GROUPS);
        let body = InstantiateTemplateRequest {
            template_id: template_id.to_string(),
            origin_x: origin.x,
            origin_y: origin.y,
        };
        let response = self.request(Method::POST, &path)?.json(&body).send().await?;
        Self::handle_response(response, "instantiate template").await
    }

    async fn list_templates(&self) -> Result<Vec<TemplateEntity>> {
        let response = self
            .request(Method::GET, api_paths::FLOW_TEMPLATES)?
            .send()
            .await?;
        let templates: TemplatesEntity = Self::handle_response(response, "list templates").await?;
        Ok(templates.templates)
    }

    async fn remove_template(&self, template_id: &str) -> Result<()> {
        let path = format!("{}/{template_id}", api_paths::TEMPLATES);
        let response = self.request(Method::DELETE, &path)?.send().await?;
        Self::handle_empty(response, "remove template").await
    }

    async fn get_connection(&self, connection_id: &str) -> Result<ConnectionEntity> {
        let path = format!("{}/{connection_id}", api_paths::CONNECTIONS);
        let response = self.request(Method::GET, &path)?.send().await?;
        Self::handle_response(response, "get connection").await
    }
}
