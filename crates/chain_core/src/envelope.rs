use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::contract::{
    format_timestamp, ServiceRecord, ServiceRecordData, WorkflowEnvelope, WorkflowInput,
};
use crate::error::ChainError;

/// What one chain hop observed about its own execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub service_name: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub service_ip: String,
    pub hostname: String,
}

pub fn parse_input(body: Map<String, Value>) -> Result<WorkflowInput, ChainError> {
    serde_json::from_value(Value::Object(body))
        .map_err(|error| ChainError::InvalidInput(format!("malformed workflow input: {error}")))
}

/// The chain's origin timestamp. Any value the caller would consider truthy
/// is carried over verbatim; otherwise this hop starts the chain.
fn resolve_origin(existing: Option<Value>, fallback: &str) -> Value {
    match existing {
        Some(value) if !is_falsy(&value) => value,
        _ => Value::from(fallback),
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::String(text) => text.is_empty(),
        Value::Number(number) => number.as_f64().map_or(false, |n| n == 0.0),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Appends this hop's record to the envelope carried by `input`.
///
/// Existing records are moved over unchanged and the origin timestamp is
/// never rewritten once set.
pub fn append_invocation(
    input: WorkflowInput,
    invocation: &Invocation,
) -> Result<WorkflowEnvelope, ChainError> {
    let started = format_timestamp(invocation.started_at);
    let finished = format_timestamp(invocation.finished_at);
    let origin = resolve_origin(input.start_date_time, &started);

    let mut records = match input.services_response {
        Some(Value::Array(records)) => records,
        _ => Vec::new(),
    };
    let previous_services_count = records.len();

    let record = ServiceRecord {
        service_name: invocation.service_name.clone(),
        processing_time_ms: elapsed_millis(invocation.started_at, invocation.finished_at),
        start_date_time: started,
        end_date_time: finished,
        service_ip: invocation.service_ip.clone(),
        hostname: invocation.hostname.clone(),
        data: ServiceRecordData {
            message: format!(
                "Data processed successfully by {}",
                invocation.service_name
            ),
            original_request_data: input.business,
            previous_services_count,
        },
    };

    records.push(serde_json::to_value(record)?);

    Ok(WorkflowEnvelope {
        start_date_time: origin,
        end_date_time: String::new(),
        services_response: records,
    })
}

// Computed on millisecond-truncated instants so the value matches the two
// rendered timestamps exactly.
fn elapsed_millis(started_at: DateTime<Utc>, finished_at: DateTime<Utc>) -> i64 {
    (finished_at.timestamp_millis() - started_at.timestamp_millis()).max(0)
}
