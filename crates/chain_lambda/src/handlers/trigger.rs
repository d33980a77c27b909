use chain_core::contract::{now_timestamp, ErrorBody};
use chain_core::error::ChainError;
use chain_core::execution_name::new_execution_name;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::adapters::orchestrator::{ExecutionStarter, StartExecutionRequest};
use crate::config::{TriggerConfig, STATE_MACHINE_ARN_KEY};

pub const TRIGGER_CONTEXT: &str = "workflow-trigger";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiGatewayResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: Value,
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TriggerAccepted {
    pub message: String,
    #[serde(rename = "executionArn")]
    pub execution_arn: String,
    #[serde(rename = "executionName")]
    pub execution_name: String,
    #[serde(rename = "startDate")]
    pub start_date: String,
}

/// Starts one workflow execution for an API Gateway proxy event.
///
/// Every outcome, including misconfiguration, is rendered as a response;
/// nothing here returns a Lambda invocation error.
pub fn handle_trigger_event(
    event: Value,
    config: &TriggerConfig,
    starter: &dyn ExecutionStarter,
) -> ApiGatewayResponse {
    let input = match extract_body(&event) {
        Ok(value) => value,
        Err(error) => {
            tracing::warn!(%error, "error parsing request body");
            return failure_response(400, "Invalid JSON in request body", &error, None);
        }
    };

    let Some(state_machine_arn) = config.state_machine_arn.as_deref() else {
        let error = ChainError::MissingConfiguration(STATE_MACHINE_ARN_KEY.to_string());
        tracing::error!(%error, "workflow trigger is misconfigured");
        return failure_response(500, "Configuration error", &error, None);
    };

    let execution_name = new_execution_name();
    let request = StartExecutionRequest {
        state_machine_arn: state_machine_arn.to_string(),
        name: execution_name.clone(),
        input: input.to_string(),
    };

    tracing::info!(
        state_machine_arn,
        execution_name = %execution_name,
        input = %request.input,
        "starting workflow execution"
    );

    match starter.start_execution(&request) {
        Ok(reference) => {
            tracing::info!(
                execution_arn = %reference.execution_arn,
                start_date = %reference.start_date,
                "workflow execution started"
            );
            success_response(
                200,
                TriggerAccepted {
                    message: "Workflow execution started successfully".to_string(),
                    execution_arn: reference.execution_arn,
                    execution_name,
                    start_date: reference.start_date,
                },
            )
        }
        Err(message) => {
            let error = ChainError::UpstreamFailure(message.clone());
            tracing::error!(%error, "error starting workflow execution");
            failure_response(
                500,
                "Failed to start workflow execution",
                &error,
                Some(message),
            )
        }
    }
}

/// The execution input. A missing, null or empty body means `{}`.
fn extract_body(event: &Value) -> Result<Value, ChainError> {
    let Some(object) = event.as_object() else {
        return Err(ChainError::InvalidInput(
            "Request payload must be a JSON object".to_string(),
        ));
    };

    match object.get("body") {
        None | Some(Value::Null) => Ok(Value::Object(Map::new())),
        Some(Value::String(text)) if text.is_empty() => Ok(Value::Object(Map::new())),
        Some(Value::String(text)) => serde_json::from_str(text)
            .map_err(|error| ChainError::InvalidInput(format!("Malformed JSON body: {error}"))),
        Some(Value::Object(_)) => Ok(object["body"].clone()),
        Some(_) => Err(ChainError::InvalidInput(
            "Request body must be a JSON string or object".to_string(),
        )),
    }
}

fn response_headers() -> Value {
    json!({
        "Content-Type": "application/json",
        "Access-Control-Allow-Origin": "*",
    })
}

fn success_response(status_code: u16, payload: impl Serialize) -> ApiGatewayResponse {
    ApiGatewayResponse {
        status_code,
        headers: response_headers(),
        body: serde_json::to_string_pretty(&payload).unwrap_or_else(|error| {
            json!({"error": "serialization", "message": error.to_string()}).to_string()
        }),
    }
}

fn failure_response(
    status_code: u16,
    summary: &str,
    error: &ChainError,
    details: Option<String>,
) -> ApiGatewayResponse {
    success_response(
        status_code,
        ErrorBody {
            error: summary.to_string(),
            kind: error.kind().to_string(),
            service: TRIGGER_CONTEXT.to_string(),
            message: error.to_string(),
            timestamp: now_timestamp(),
            details,
        },
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use crate::adapters::orchestrator::ExecutionReference;

    use super::*;

    struct CapturingStarter {
        requests: Mutex<Vec<StartExecutionRequest>>,
        failure: Option<&'static str>,
    }

    impl CapturingStarter {
        fn new() -> Self {
            Self {
                requests: Mutex::new(Vec::new()),
                failure: None,
            }
        }

        fn failing(message: &'static str) -> Self {
            Self {
                requests: Mutex::new(Vec::new()),
                failure: Some(message),
            }
        }

        fn requests(&self) -> Vec<StartExecutionRequest> {
            self.requests.lock().expect("poisoned mutex").clone()
        }
    }

    impl ExecutionStarter for CapturingStarter {
        fn start_execution(
            &self,
            request: &StartExecutionRequest,
        ) -> Result<ExecutionReference, String> {
            self.requests
                .lock()
                .expect("poisoned mutex")
                .push(request.clone());
            match self.failure {
                Some(message) => Err(message.to_string()),
                None => Ok(ExecutionReference {
                    execution_arn: format!("arn:aws:states:us-east-1:123:execution:chain:{}", request.name),
                    start_date: "2025-10-19T10:00:00Z".to_string(),
                }),
            }
        }
    }

    fn configured() -> TriggerConfig {
        TriggerConfig {
            state_machine_arn: Some("arn:aws:states:us-east-1:123:stateMachine:chain".to_string()),
        }
    }

    fn body_of(response: &ApiGatewayResponse) -> Value {
        serde_json::from_str(&response.body).expect("body should be JSON")
    }

    #[test]
    fn starts_execution_with_parsed_body() {
        let starter = CapturingStarter::new();
        let response = handle_trigger_event(
            json!({"body": "{\"userId\":123,\"action\":\"test-workflow\"}"}),
            &configured(),
            &starter,
        );

        assert_eq!(response.status_code, 200);
        assert_eq!(response.headers["Access-Control-Allow-Origin"], "*");

        let requests = starter.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].state_machine_arn,
            "arn:aws:states:us-east-1:123:stateMachine:chain"
        );
        assert!(requests[0].name.starts_with("execution-"));
        let input: Value = serde_json::from_str(&requests[0].input).expect("input is JSON");
        assert_eq!(input, json!({"userId": 123, "action": "test-workflow"}));

        let body = body_of(&response);
        assert_eq!(body["message"], "Workflow execution started successfully");
        assert_eq!(body["executionName"], requests[0].name.as_str());
        assert!(body["executionArn"]
            .as_str()
            .unwrap()
            .ends_with(&requests[0].name));
        assert_eq!(body["startDate"], "2025-10-19T10:00:00Z");
    }

    #[test]
    fn missing_body_starts_with_empty_input() {
        let starter = CapturingStarter::new();
        let response = handle_trigger_event(json!({"body": null}), &configured(), &starter);

        assert_eq!(response.status_code, 200);
        assert_eq!(starter.requests()[0].input, "{}");
    }

    #[test]
    fn rejects_malformed_body_without_starting() {
        let starter = CapturingStarter::new();
        let response = handle_trigger_event(json!({"body": "{not json"}), &configured(), &starter);

        assert_eq!(response.status_code, 400);
        assert!(starter.requests().is_empty());
        let body = body_of(&response);
        assert_eq!(body["error"], "Invalid JSON in request body");
        assert_eq!(body["kind"], "invalid_input");
    }

    #[test]
    fn rejects_whitespace_body_without_starting() {
        let starter = CapturingStarter::new();
        let response = handle_trigger_event(json!({"body": "   "}), &configured(), &starter);

        assert_eq!(response.status_code, 400);
        assert!(starter.requests().is_empty());
        assert_eq!(body_of(&response)["kind"], "invalid_input");
    }

    #[test]
    fn missing_state_machine_is_structured_500() {
        let starter = CapturingStarter::new();
        let response = handle_trigger_event(
            json!({"body": "{}"}),
            &TriggerConfig::default(),
            &starter,
        );

        assert_eq!(response.status_code, 500);
        assert!(starter.requests().is_empty());
        let body = body_of(&response);
        assert_eq!(body["error"], "Configuration error");
        assert_eq!(body["kind"], "missing_configuration");
        assert_eq!(body["message"], "STATE_MACHINE_ARN is not configured");
        assert!(body["timestamp"].is_string());
    }

    #[test]
    fn orchestrator_failure_is_structured_500() {
        let starter = CapturingStarter::failing("ExecutionAlreadyExists: name in use");
        let response = handle_trigger_event(json!({"body": "{}"}), &configured(), &starter);

        assert_eq!(response.status_code, 500);
        assert_eq!(starter.requests().len(), 1);
        let body = body_of(&response);
        assert_eq!(body["error"], "Failed to start workflow execution");
        assert_eq!(body["kind"], "upstream_failure");
        assert_eq!(body["details"], "ExecutionAlreadyExists: name in use");
    }

    #[test]
    fn accepts_pre_decoded_object_body() {
        let starter = CapturingStarter::new();
        let response = handle_trigger_event(
            json!({"body": {"orderId": "A-1"}}),
            &configured(),
            &starter,
        );

        assert_eq!(response.status_code, 200);
        let input: Value = serde_json::from_str(&starter.requests()[0].input).unwrap();
        assert_eq!(input["orderId"], "A-1");
    }
}
