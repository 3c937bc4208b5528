use thiserror::Error;
use tracing::{error, info, instrument, warn};

use super::{ComposioError, ExpectedInputField, IntegrationService};

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("GitHub connection could not be verified: {0}")]
    Unverified(#[source] ComposioError),
}

/// Where the integration stands after the connection check.
#[derive(Debug)]
pub enum ConnectionStatus {
    /// At least one connected account exists.
    Connected { integration: String, connections: usize },
    /// No account was connected; the operator has to finish auth at `redirect_url`
    /// and restart.
    PendingSetup {
        redirect_url: Option<String>,
        required_fields: Vec<ExpectedInputField>,
    },
    /// The check itself failed and the run continues without knowing.
    Unverified { reason: String },
}

/// Check that the integration has a connected account, initiating one for
/// `entity_id` when it has none.
///
/// Lookup failures are downgraded to [`ConnectionStatus::Unverified`] unless
/// `strict` is set, in which case they surface as [`ConnectionError::Unverified`].
#[instrument(skip(service))]
pub async fn ensure_connected(
    service: &dyn IntegrationService,
    integration_id: &str,
    entity_id: &str,
    strict: bool,
) -> Result<ConnectionStatus, ConnectionError> {
    match check(service, integration_id, entity_id).await {
        Ok(status) => Ok(status),
        Err(err) if strict => {
            error!(error = %err, "error checking GitHub integration");
            Err(ConnectionError::Unverified(err))
        }
        Err(err) => {
            error!(error = %err, "error checking GitHub integration, continuing");
            Ok(ConnectionStatus::Unverified {
                reason: err.to_string(),
            })
        }
    }
}

async fn check(
    service: &dyn IntegrationService,
    integration_id: &str,
    entity_id: &str,
) -> Result<ConnectionStatus, ComposioError> {
    let integration = service.get_integration(integration_id).await?;
    let statuses: Vec<&str> = integration
        .connections
        .iter()
        .map(|c| c.status.as_deref().unwrap_or("unknown"))
        .collect();
    info!(
        integration = %integration.name,
        app = integration.app_name.as_deref().unwrap_or("-"),
        connections = integration.connections.len(),
        ?statuses,
        "GitHub integration found"
    );

    if !integration.connections.is_empty() {
        info!("GitHub connection exists");
        return Ok(ConnectionStatus::Connected {
            connections: integration.connections.len(),
            integration: integration.name,
        });
    }

    warn!("no GitHub connection found, initiating connection");
    let required_fields = service.required_params(&integration.id).await?;
    let fields: Vec<&str> = required_fields
        .iter()
        .map(|f| f.display_name.as_deref().unwrap_or(&f.name))
        .collect();
    let required = required_fields.iter().filter(|f| f.required).count();
    info!(?fields, required, "required auth fields");

    let request = service.initiate_connection(&integration.id, entity_id).await?;
    info!(
        status = request.connection_status.as_deref().unwrap_or("unknown"),
        account = request.connected_account_id.as_deref().unwrap_or("-"),
        "connection initiated"
    );
    Ok(ConnectionStatus::PendingSetup {
        redirect_url: request.redirect_url,
        required_fields,
    })
}
