pub const STATE_MACHINE_ARN_KEY: &str = "STATE_MACHINE_ARN";
pub const SERVICE_ENDPOINT_KEY: &str = "SERVICE_ENDPOINT";
pub const SERVICE_NAME_KEY: &str = "SERVICE_NAME";
pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_PROXY_SERVICE_NAME: &str = "chain-service";

/// Settings for the workflow trigger. A missing ARN is reported per
/// invocation rather than at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerConfig {
    pub state_machine_arn: Option<String>,
}

impl TriggerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            state_machine_arn: non_blank(lookup(STATE_MACHINE_ARN_KEY)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    pub service_endpoint: Option<String>,
    pub service_name: String,
}

impl ProxyConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            service_endpoint: non_blank(lookup(SERVICE_ENDPOINT_KEY)),
            service_name: non_blank(lookup(SERVICE_NAME_KEY))
                .unwrap_or_else(|| DEFAULT_PROXY_SERVICE_NAME.to_string()),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
