use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use chain_core::contract::{now_timestamp, ErrorBody, NotFoundBody, HEALTHY_STATUS};
use chain_core::error::ChainError;

use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub timestamp: String,
    pub uptime: f64,
    pub hostname: String,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: HEALTHY_STATUS.to_string(),
        service: state.service_name().to_string(),
        timestamp: now_timestamp(),
        uptime: state.uptime_secs(),
        hostname: state.processor.hostname(),
    })
}

pub async fn process(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    let body = match payload {
        Ok(Json(Value::Object(body))) => body,
        Ok(Json(other)) => {
            return invalid_body(
                &state,
                StatusCode::BAD_REQUEST,
                format!("request body must be a JSON object, got {}", json_type(&other)),
            );
        }
        Err(rejection) => {
            return invalid_body(&state, rejection.status(), rejection.body_text());
        }
    };

    match state.processor.process(body).await {
        Ok(envelope) => {
            tracing::debug!(
                payload = %serde_json::to_string(&envelope).unwrap_or_default(),
                "response payload"
            );
            Json(envelope).into_response()
        }
        Err(error) => {
            tracing::error!(kind = error.kind(), %error, "error processing request");
            processing_failed(&state, &error)
        }
    }
}

pub async fn not_found(State(state): State<Arc<AppState>>, uri: Uri) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(NotFoundBody {
            error: "Not Found".to_string(),
            path: uri.path().to_string(),
            service: state.service_name().to_string(),
        }),
    )
        .into_response()
}

fn processing_failed(state: &AppState, error: &ChainError) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            error: "Processing failed".to_string(),
            kind: error.kind().to_string(),
            service: state.service_name().to_string(),
            message: error.to_string(),
            timestamp: now_timestamp(),
            details: None,
        }),
    )
        .into_response()
}

fn invalid_body(state: &AppState, status: StatusCode, message: String) -> Response {
    let error = ChainError::InvalidInput(message);
    tracing::warn!(%status, %error, "rejected request body");
    (
        status,
        Json(ErrorBody {
            error: "Invalid request body".to_string(),
            kind: error.kind().to_string(),
            service: state.service_name().to_string(),
            message: error.to_string(),
            timestamp: now_timestamp(),
            details: None,
        }),
    )
        .into_response()
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
