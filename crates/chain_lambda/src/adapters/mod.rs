pub mod orchestrator;
pub mod service_client;
