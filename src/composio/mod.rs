pub mod connection;
#[cfg(test)]
pub mod mock;
pub mod types;

pub use types::{ConnectionRequest, ExpectedInputField, Integration, ToolInfo};

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::ComposioConfig;
use types::{
    ActionListResponse, ExecuteActionBody, InitiateConnectionBody, RequiredParamsResponse,
};

#[derive(Debug, Error)]
pub enum ComposioError {
    #[error("Composio API request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Composio API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Failed to decode Composio response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Account/integration side of the Composio backend.
#[async_trait]
pub trait IntegrationService: Send + Sync {
    async fn get_integration(&self, integration_id: &str) -> Result<Integration, ComposioError>;

    async fn required_params(
        &self,
        integration_id: &str,
    ) -> Result<Vec<ExpectedInputField>, ComposioError>;

    async fn initiate_connection(
        &self,
        integration_id: &str,
        entity_id: &str,
    ) -> Result<ConnectionRequest, ComposioError>;
}

/// Action side of the Composio backend: list tools for an app, run one.
#[async_trait]
pub trait ActionExecutor: Send + Sync {
    async fn list_actions(&self, app: &str) -> Result<Vec<ToolInfo>, ComposioError>;

    /// Execute an action and return the raw JSON response body.
    /// The payload lives under its `data` field.
    async fn execute(&self, action: &str, input: &Value) -> Result<String, ComposioError>;
}

/// HTTP client for the Composio REST API.
pub struct ComposioClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    entity_id: String,
    app: String,
}

impl ComposioClient {
    pub fn new(config: &ComposioConfig, api_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            entity_id: config.entity_id.clone(),
            app: config.app.clone(),
        }
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .header("x-api-key", &self.api_key)
            .header("User-Agent", "star-advisor")
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.client
            .post(format!("{}{}", self.base_url, path))
            .header("x-api-key", &self.api_key)
            .header("User-Agent", "star-advisor")
    }

    /// Send a request and return the body, turning non-2xx into `ComposioError::Api`.
    async fn send(&self, request: RequestBuilder) -> Result<String, ComposioError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ComposioError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ComposioError> {
        let body = self.send(request).await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl IntegrationService for ComposioClient {
    #[instrument(skip(self))]
    async fn get_integration(&self, integration_id: &str) -> Result<Integration, ComposioError> {
        self.send_json(self.get(&format!("/api/v1/integrations/{integration_id}")))
            .await
    }

    #[instrument(skip(self))]
    async fn required_params(
        &self,
        integration_id: &str,
    ) -> Result<Vec<ExpectedInputField>, ComposioError> {
        let response: RequiredParamsResponse = self
            .send_json(self.get(&format!("/api/v1/integrations/{integration_id}/params")))
            .await?;
        Ok(response.expected_input_fields)
    }

    #[instrument(skip(self))]
    async fn initiate_connection(
        &self,
        integration_id: &str,
        entity_id: &str,
    ) -> Result<ConnectionRequest, ComposioError> {
        let body = InitiateConnectionBody {
            integration_id,
            entity_id,
        };
        self.send_json(self.post("/api/v1/connectedAccounts").json(&body))
            .await
    }
}

#[async_trait]
impl ActionExecutor for ComposioClient {
    #[instrument(skip(self))]
    async fn list_actions(&self, app: &str) -> Result<Vec<ToolInfo>, ComposioError> {
        let response: ActionListResponse = self
            .send_json(self.get("/api/v2/actions").query(&[("apps", app)]))
            .await?;
        Ok(response.items)
    }

    #[instrument(skip(self, input))]
    async fn execute(&self, action: &str, input: &Value) -> Result<String, ComposioError> {
        let body = ExecuteActionBody {
            entity_id: &self.entity_id,
            app_name: &self.app,
            input,
        };
        let text = self
            .send(self.post(&format!("/api/v2/actions/{action}/execute")).json(&body))
            .await?;
        debug!(bytes = text.len(), "action executed");
        Ok(text)
    }
}

/// The tools available for one app, in the order the backend returned them.
pub struct ToolCatalog {
    tools: Vec<ToolInfo>,
    executor: Arc<dyn ActionExecutor>,
}

/// A tool looked up from a [`ToolCatalog`], ready to invoke.
pub struct Tool<'a> {
    pub info: &'a ToolInfo,
    executor: &'a dyn ActionExecutor,
}

impl ToolCatalog {
    pub fn new(tools: Vec<ToolInfo>, executor: Arc<dyn ActionExecutor>) -> Self {
        Self { tools, executor }
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name.as_str()).collect()
    }

    /// Exact-name lookup. The first match wins if the backend sent duplicates.
    pub fn find(&self, name: &str) -> Option<Tool<'_>> {
        self.tools.iter().find(|t| t.name == name).map(|info| Tool {
            info,
            executor: self.executor.as_ref(),
        })
    }

    /// Names containing `needle`, compared case-insensitively.
    pub fn names_containing(&self, needle: &str) -> Vec<&str> {
        let needle = needle.to_lowercase();
        self.tools
            .iter()
            .filter(|t| t.name.to_lowercase().contains(&needle))
            .map(|t| t.name.as_str())
            .collect()
    }
}

impl Tool<'_> {
    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub async fn invoke(&self, input: &Value) -> Result<String, ComposioError> {
        self.executor.execute(&self.info.name, input).await
    }
}

/// Fetch the tool catalog for `app`. Callers treat failure as fatal.
#[instrument(skip(executor))]
pub async fn fetch_catalog(
    executor: Arc<dyn ActionExecutor>,
    app: &str,
) -> Result<ToolCatalog, ComposioError> {
    let tools = executor.list_actions(app).await?;
    debug!(tools = tools.len(), "received tool catalog");
    Ok(ToolCatalog::new(tools, executor))
}
