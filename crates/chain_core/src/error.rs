use thiserror::Error;

/// Errors raised while processing a chain hop or starting a workflow.
///
/// Every variant is recovered at the HTTP or Lambda boundary and rendered
/// as a structured JSON body; none of them terminate the serving process.
#[derive(Error, Debug)]
pub enum ChainError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("upstream call failed: {0}")]
    UpstreamFailure(String),

    #[error("{0} is not configured")]
    MissingConfiguration(String),

    #[error("failed to enumerate network interfaces: {0}")]
    HostLookup(#[from] std::io::Error),

    #[error("failed to serialize payload: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ChainError {
    /// Stable category string carried in error response bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::UpstreamFailure(_) => "upstream_failure",
            Self::MissingConfiguration(_) => "missing_configuration",
            Self::HostLookup(_) => "host_lookup",
            Self::Serialization(_) => "serialization",
        }
    }
}
