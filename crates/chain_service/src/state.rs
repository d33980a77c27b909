use std::sync::Arc;
use std::time::Instant;

use crate::config::ServiceConfig;
use crate::host::{HostInfo, SystemHost};
use crate::processor::ChainProcessor;

/// Shared application state accessible by all handlers
pub struct AppState {
    pub processor: ChainProcessor,
    started_at: Instant,
}

impl AppState {
    pub fn new(config: ServiceConfig) -> Arc<Self> {
        Self::with_host(config, Arc::new(SystemHost))
    }

    pub fn with_host(config: ServiceConfig, host: Arc<dyn HostInfo>) -> Arc<Self> {
        let processor = ChainProcessor::new(config.service_name, config.latency, host);
        Arc::new(Self {
            processor,
            started_at: Instant::now(),
        })
    }

    pub fn service_name(&self) -> &str {
        self.processor.service_name()
    }

    /// Seconds since the state was built, i.e. since process startup.
    pub fn uptime_secs(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64()
    }
}
