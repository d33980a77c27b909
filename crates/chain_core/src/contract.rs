use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const HEALTHY_STATUS: &str = "healthy";
pub const UNKNOWN_VALUE: &str = "unknown";

/// The document threaded through a chain of service calls.
///
/// Upstream records and the origin timestamp are kept as raw JSON so values
/// written by other service versions pass through untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkflowEnvelope {
    #[serde(rename = "startDateTime")]
    pub start_date_time: Value,
    #[serde(rename = "endDateTime")]
    pub end_date_time: String,
    pub services_response: Vec<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceRecord {
    pub service_name: String,
    #[serde(rename = "startDateTime")]
    pub start_date_time: String,
    #[serde(rename = "endDateTime")]
    pub end_date_time: String,
    pub service_ip: String,
    pub hostname: String,
    #[serde(rename = "processingTimeMs")]
    pub processing_time_ms: i64,
    pub data: ServiceRecordData,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceRecordData {
    pub message: String,
    #[serde(rename = "originalRequestData")]
    pub original_request_data: Map<String, Value>,
    #[serde(rename = "previousServicesCount")]
    pub previous_services_count: usize,
}

/// Incoming `/process` body split into bookkeeping fields and business data.
///
/// The reserved keys are captured by name and everything else the caller
/// sent lands in `business`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WorkflowInput {
    #[serde(
        rename = "startDateTime",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub start_date_time: Option<Value>,
    #[serde(
        rename = "endDateTime",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub end_date_time: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub services_response: Option<Value>,
    #[serde(flatten)]
    pub business: Map<String, Value>,
}

/// Structured failure body shared by the HTTP service and the Lambdas.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub error: String,
    pub kind: String,
    pub service: String,
    pub message: String,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotFoundBody {
    pub error: String,
    pub path: String,
    pub service: String,
}

/// ISO-8601 UTC with millisecond precision, e.g. `2025-10-19T10:00:00.250Z`.
pub fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn now_timestamp() -> String {
    format_timestamp(Utc::now())
}
