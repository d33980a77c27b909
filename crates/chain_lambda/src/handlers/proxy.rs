use chain_core::error::ChainError;
use serde_json::Value;

use crate::adapters::service_client::ServiceClient;
use crate::config::{ProxyConfig, SERVICE_ENDPOINT_KEY};

pub fn process_url(endpoint: &str) -> String {
    format!("{}/process", endpoint.trim_end_matches('/'))
}

/// Forwards a workflow document to one chain service and returns its reply.
///
/// Failures come back as errors so the orchestrator's retry policy sees a
/// failed task.
pub fn handle_proxy_event(
    event: &Value,
    config: &ProxyConfig,
    client: &dyn ServiceClient,
) -> Result<Value, ChainError> {
    let endpoint = config
        .service_endpoint
        .as_deref()
        .ok_or_else(|| ChainError::MissingConfiguration(SERVICE_ENDPOINT_KEY.to_string()))?;

    let url = process_url(endpoint);
    let body = serde_json::to_vec(event)?;
    tracing::info!(service = %config.service_name, %url, "forwarding workflow document");

    let reply = client.post_json(&url, &body).map_err(|error| {
        ChainError::UpstreamFailure(format!("error calling {}: {error}", config.service_name))
    })?;

    if !(200..300).contains(&reply.status_code) {
        return Err(ChainError::UpstreamFailure(format!(
            "{} responded with status {}: {}",
            config.service_name,
            reply.status_code,
            String::from_utf8_lossy(&reply.body)
        )));
    }

    let response: Value = serde_json::from_slice(&reply.body).map_err(|error| {
        ChainError::UpstreamFailure(format!(
            "failed to parse response from {}: {error}",
            config.service_name
        ))
    })?;

    tracing::info!(service = %config.service_name, "service responded");
    Ok(response)
}
