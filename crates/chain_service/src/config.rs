use anyhow::{bail, Context, Result};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_SERVICE_NAME: &str = "unknown-service";
pub const DEFAULT_LATENCY_MIN_MS: u64 = 100;
pub const DEFAULT_LATENCY_MAX_MS: u64 = 500;

/// Half-open latency window `[min_ms, max_ms)` for the simulated work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencyRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl Default for LatencyRange {
    fn default() -> Self {
        Self {
            min_ms: DEFAULT_LATENCY_MIN_MS,
            max_ms: DEFAULT_LATENCY_MAX_MS,
        }
    }
}

/// Service configuration, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub port: u16,
    pub service_name: String,
    pub latency: LatencyRange,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            latency: LatencyRange::default(),
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("PORT must be a valid port number, got '{raw}'"))?,
            None => DEFAULT_PORT,
        };

        let service_name = lookup("SERVICE_NAME")
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| DEFAULT_SERVICE_NAME.to_string());

        let min_ms = parse_millis(&lookup, "SIMULATED_LATENCY_MIN_MS", DEFAULT_LATENCY_MIN_MS)?;
        let max_ms = parse_millis(&lookup, "SIMULATED_LATENCY_MAX_MS", DEFAULT_LATENCY_MAX_MS)?;
        if min_ms >= max_ms {
            bail!(
                "SIMULATED_LATENCY_MIN_MS ({min_ms}) must be less than SIMULATED_LATENCY_MAX_MS ({max_ms})"
            );
        }

        Ok(Self {
            port,
            service_name,
            latency: LatencyRange { min_ms, max_ms },
        })
    }
}

fn parse_millis(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: u64,
) -> Result<u64> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .with_context(|| format!("{key} must be a non-negative integer, got '{raw}'")),
        None => Ok(default),
    }
}
