pub mod bridge;
pub mod config;
pub mod error;
pub mod telemetry;
pub mod transport;

// Re-export specific items for convenient access
pub use bridge::reactor::Bridge;
pub use telemetry::registry::MetricsRegistry;
