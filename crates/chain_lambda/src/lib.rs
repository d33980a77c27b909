//! AWS-oriented adapters and handlers for the service chain workflow.
//!
//! This crate owns runtime integration details (Lambda handlers, the Step
//! Functions client seam, and the HTTP forwarder seam). Envelope semantics
//! stay in `chain_core`.

pub mod adapters;
pub mod config;
pub mod handlers;
