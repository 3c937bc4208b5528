use serde::{Deserialize, Serialize};

/// An integration as returned by `GET /api/v1/integrations/{id}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Integration {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub app_name: Option<String>,
    /// Connected accounts bound to this integration. Absent means none.
    #[serde(default)]
    pub connections: Vec<Connection>,
}

/// A connected account summary nested in an integration.
#[derive(Debug, Clone, Deserialize)]
pub struct Connection {
    #[serde(default)]
    pub status: Option<String>,
}

/// An auth field the integration expects when a connection is initiated.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpectedInputField {
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub required: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RequiredParamsResponse {
    #[serde(default)]
    pub expected_input_fields: Vec<ExpectedInputField>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InitiateConnectionBody<'a> {
    pub integration_id: &'a str,
    pub entity_id: &'a str,
}

/// Result of initiating a connection: the operator must visit `redirect_url`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionRequest {
    pub redirect_url: Option<String>,
    #[serde(default)]
    pub connection_status: Option<String>,
    #[serde(default)]
    pub connected_account_id: Option<String>,
}

/// A callable action ("tool") from the catalog. Lookup is by name only.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolInfo {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ActionListResponse {
    #[serde(default)]
    pub items: Vec<ToolInfo>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ExecuteActionBody<'a> {
    pub entity_id: &'a str,
    pub app_name: &'a str,
    pub input: &'a serde_json::Value,
}
