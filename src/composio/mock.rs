//! Recording stand-ins for the Composio services.
//!
//! Replies are keyed by action name and, optionally, the `path` field of the
//! input so README candidates can be scripted one by one.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::types::{Connection, ConnectionRequest, ExpectedInputField, Integration, ToolInfo};
use super::{ActionExecutor, ComposioError, IntegrationService};

/// Record of one `execute` call.
#[derive(Debug, Clone)]
pub struct MockCall {
    pub action: String,
    pub input: Value,
}

#[derive(Debug, Clone)]
enum MockReply {
    Body(String),
    Fail(u16, String),
}

pub struct MockExecutor {
    tools: Vec<ToolInfo>,
    replies: HashMap<(String, Option<String>), MockReply>,
    fail_list: bool,
    list_calls: Mutex<usize>,
    calls: Mutex<Vec<MockCall>>,
}

impl MockExecutor {
    pub fn new(names: &[&str]) -> Self {
        Self {
            tools: names
                .iter()
                .map(|name| ToolInfo {
                    name: name.to_string(),
                })
                .collect(),
            replies: HashMap::new(),
            fail_list: false,
            list_calls: Mutex::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Reply to any call of `action` not matched by a path-specific reply.
    pub fn reply(mut self, action: &str, body: &str) -> Self {
        self.replies
            .insert((action.to_string(), None), MockReply::Body(body.to_string()));
        self
    }

    pub fn reply_for_path(mut self, action: &str, path: &str, body: &str) -> Self {
        self.replies.insert(
            (action.to_string(), Some(path.to_string())),
            MockReply::Body(body.to_string()),
        );
        self
    }

    pub fn fail(mut self, action: &str, status: u16) -> Self {
        self.replies.insert(
            (action.to_string(), None),
            MockReply::Fail(status, "mock failure".to_string()),
        );
        self
    }

    pub fn failing_list(mut self) -> Self {
        self.fail_list = true;
        self
    }

    pub fn tools(&self) -> Vec<ToolInfo> {
        self.tools.clone()
    }

    /// Number of catalog fetches seen.
    pub fn list_calls(&self) -> usize {
        *self.list_calls.lock().unwrap()
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, action: &str) -> Vec<MockCall> {
        self.calls()
            .into_iter()
            .filter(|call| call.action == action)
            .collect()
    }
}

#[async_trait]
impl ActionExecutor for MockExecutor {
    async fn list_actions(&self, _app: &str) -> Result<Vec<ToolInfo>, ComposioError> {
        *self.list_calls.lock().unwrap() += 1;
        if self.fail_list {
            return Err(ComposioError::Api {
                status: 500,
                body: "catalog unavailable".to_string(),
            });
        }
        Ok(self.tools.clone())
    }

    async fn execute(&self, action: &str, input: &Value) -> Result<String, ComposioError> {
        self.calls.lock().unwrap().push(MockCall {
            action: action.to_string(),
            input: input.clone(),
        });

        let path = input.get("path").and_then(Value::as_str).map(str::to_string);
        let reply = self
            .replies
            .get(&(action.to_string(), path))
            .or_else(|| self.replies.get(&(action.to_string(), None)));

        match reply {
            Some(MockReply::Body(body)) => Ok(body.clone()),
            Some(MockReply::Fail(status, body)) => Err(ComposioError::Api {
                status: *status,
                body: body.clone(),
            }),
            None => Err(ComposioError::Api {
                status: 404,
                body: "Not Found".to_string(),
            }),
        }
    }
}

/// Integration service with a fixed number of connections, or a lookup failure.
pub struct MockIntegrations {
    connections: Option<usize>,
    pub lookups: Mutex<usize>,
    pub initiated: Mutex<Vec<(String, String)>>,
}

impl MockIntegrations {
    pub fn with_connections(count: usize) -> Self {
        Self {
            connections: Some(count),
            lookups: Mutex::new(0),
            initiated: Mutex::new(Vec::new()),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            connections: None,
            lookups: Mutex::new(0),
            initiated: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl IntegrationService for MockIntegrations {
    async fn get_integration(&self, integration_id: &str) -> Result<Integration, ComposioError> {
        *self.lookups.lock().unwrap() += 1;
        let count = self.connections.ok_or_else(|| ComposioError::Api {
            status: 503,
            body: "service unavailable".to_string(),
        })?;
        Ok(Integration {
            id: integration_id.to_string(),
            name: "GitHub".to_string(),
            app_name: Some("github".to_string()),
            connections: (0..count)
                .map(|_| Connection {
                    status: Some("ACTIVE".to_string()),
                })
                .collect(),
        })
    }

    async fn required_params(
        &self,
        _integration_id: &str,
    ) -> Result<Vec<ExpectedInputField>, ComposioError> {
        Ok(vec![ExpectedInputField {
            name: "scopes".to_string(),
            display_name: Some("Scopes".to_string()),
            required: false,
        }])
    }

    async fn initiate_connection(
        &self,
        integration_id: &str,
        entity_id: &str,
    ) -> Result<ConnectionRequest, ComposioError> {
        self.initiated
            .lock()
            .unwrap()
            .push((integration_id.to_string(), entity_id.to_string()));
        Ok(ConnectionRequest {
            redirect_url: Some("https://backend.composio.dev/connect/abc".to_string()),
            connection_status: Some("INITIATED".to_string()),
            connected_account_id: Some("ca-1".to_string()),
        })
    }
}
