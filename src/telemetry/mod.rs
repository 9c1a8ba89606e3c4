//! Metrics registry and its HTTP exposition.

pub mod exporter;
pub mod metrics;
pub mod registry;
