//! Shared service-chain domain primitives.
//!
//! This crate owns the workflow envelope contract and the append-only
//! record logic every chain hop applies. It intentionally excludes HTTP,
//! AWS SDK and Lambda runtime concerns.

pub mod contract;
pub mod envelope;
pub mod error;
pub mod execution_name;
