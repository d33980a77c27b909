use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rand::Rng;
use serde_json::{Map, Value};

use chain_core::contract::WorkflowEnvelope;
use chain_core::envelope::{append_invocation, parse_input, Invocation};
use chain_core::error::ChainError;

use crate::config::LatencyRange;
use crate::host::HostInfo;

/// One hop of the service chain: waits out the simulated work, then appends
/// a record describing itself to the incoming envelope.
pub struct ChainProcessor {
    service_name: String,
    latency: LatencyRange,
    host: Arc<dyn HostInfo>,
}

impl ChainProcessor {
    pub fn new(
        service_name: impl Into<String>,
        latency: LatencyRange,
        host: Arc<dyn HostInfo>,
    ) -> Self {
        Self {
            service_name: service_name.into(),
            latency,
            host,
        }
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub fn hostname(&self) -> String {
        self.host.hostname()
    }

    pub async fn process(
        &self,
        body: Map<String, Value>,
    ) -> Result<WorkflowEnvelope, ChainError> {
        let started_at = Utc::now();
        tracing::debug!(
            service = %self.service_name,
            payload = %serde_json::to_string(&body).unwrap_or_default(),
            "processing request"
        );
        let input = parse_input(body)?;

        let delay = self.sample_latency();
        tokio::time::sleep(delay).await;

        let service_ip = self.host.service_ip()?;
        let finished_at = Utc::now();

        let invocation = Invocation {
            service_name: self.service_name.clone(),
            started_at,
            finished_at,
            service_ip,
            hostname: self.host.hostname(),
        };
        let envelope = append_invocation(input, &invocation)?;

        tracing::info!(
            service = %self.service_name,
            records = envelope.services_response.len(),
            simulated_ms = delay.as_millis() as u64,
            "appended service record"
        );
        Ok(envelope)
    }

    fn sample_latency(&self) -> Duration {
        let millis = rand::thread_rng().gen_range(self.latency.min_ms..self.latency.max_ms);
        Duration::from_millis(millis)
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::Mutex;
    use std::time::Instant;

    use chain_core::contract::UNKNOWN_VALUE;
    use serde_json::json;
    use tracing_subscriber::fmt::MakeWriter;

    use super::*;

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    struct FixedHost {
        ip: Option<&'static str>,
    }

    impl HostInfo for FixedHost {
        fn service_ip(&self) -> Result<String, ChainError> {
            Ok(self.ip.unwrap_or(UNKNOWN_VALUE).to_string())
        }

        fn hostname(&self) -> String {
            "test-host".to_string()
        }
    }

    struct BrokenHost;

    impl HostInfo for BrokenHost {
        fn service_ip(&self) -> Result<String, ChainError> {
            Err(ChainError::HostLookup(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "getifaddrs denied",
            )))
        }

        fn hostname(&self) -> String {
            "test-host".to_string()
        }
    }

    fn processor(host: Arc<dyn HostInfo>) -> ChainProcessor {
        ChainProcessor::new("service1", LatencyRange::default(), host)
    }

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("fixture must be an object"),
        }
    }

    #[tokio::test]
    async fn records_host_facts_and_latency() {
        let processor = processor(Arc::new(FixedHost {
            ip: Some("10.0.1.123"),
        }));

        let envelope = processor
            .process(object(json!({"userId": 123})))
            .await
            .expect("process should pass");

        let record = &envelope.services_response[0];
        assert_eq!(record["service_ip"], "10.0.1.123");
        assert_eq!(record["hostname"], "test-host");
        assert_eq!(record["service_name"], "service1");

        let elapsed = record["processingTimeMs"]
            .as_i64()
            .expect("processing time should be an integer");
        // Upper bound leaves room for scheduler slack on loaded machines.
        assert!((100..600).contains(&elapsed), "elapsed={elapsed}");
    }

    #[tokio::test]
    async fn missing_external_interface_reports_unknown() {
        let processor = processor(Arc::new(FixedHost { ip: None }));
        let envelope = processor
            .process(Map::new())
            .await
            .expect("process should pass");
        assert_eq!(envelope.services_response[0]["service_ip"], UNKNOWN_VALUE);
    }

    #[tokio::test]
    async fn host_lookup_failure_is_an_error() {
        let processor = processor(Arc::new(BrokenHost));
        let error = processor
            .process(Map::new())
            .await
            .expect_err("host lookup failure should surface");
        assert_eq!(error.kind(), "host_lookup");
    }

    #[tokio::test]
    async fn incoming_payload_is_logged_at_debug() {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(logs.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let processor = processor(Arc::new(FixedHost { ip: None }));
        processor
            .process(object(json!({"orderId": "A-1"})))
            .await
            .expect("process should pass");

        let output = logs.contents();
        let line = output
            .lines()
            .find(|line| line.contains("processing request"))
            .expect("request should be logged");
        assert!(line.contains("DEBUG"), "line={line}");
        assert!(line.contains(r#"{"orderId":"A-1"}"#), "line={line}");
    }

    #[tokio::test]
    async fn concurrent_invocations_do_not_serialize() {
        let processor = Arc::new(processor(Arc::new(FixedHost {
            ip: Some("10.0.1.123"),
        })));
        let started = Instant::now();

        let handles: Vec<_> = (0..8)
            .map(|index| {
                let processor = Arc::clone(&processor);
                tokio::spawn(async move { processor.process(object(json!({"n": index}))).await })
            })
            .collect();

        for handle in handles {
            let envelope = handle
                .await
                .expect("task should join")
                .expect("process should pass");
            assert_eq!(envelope.services_response.len(), 1);
        }

        // Eight sequential sleeps would take at least 800ms.
        assert!(started.elapsed() < Duration::from_millis(800));
    }
}
