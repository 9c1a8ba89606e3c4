//! Error taxonomy for the bridge.
//!
//! Only `BridgeError::TransportRead` is allowed to end the process. Everything
//! else is contained by the component that detected it and reported as data.

use std::io;
use thiserror::Error;

use crate::telemetry::metrics::MetricKind;

/// Registry misuse. Raised at startup, never expected once registration succeeds.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("metric '{0}' is already registered")]
    DuplicateMetric(String),

    #[error("metric '{0}' is not registered")]
    UnknownMetric(String),

    #[error("metric '{name}' is a {actual:?}, not a {expected:?}")]
    KindMismatch {
        name: String,
        expected: MetricKind,
        actual: MetricKind,
    },

    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// A payload-bearing record whose numeric field could not be read.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PayloadParseError {
    #[error("missing payload field")]
    MissingField,

    #[error("invalid number '{field}': {reason}")]
    InvalidNumber { field: String, reason: String },
}

#[derive(Error, Debug)]
pub enum BridgeError {
    /// Fatal: the loop cannot continue without a readable stream.
    #[error("transport read failed: {0}")]
    TransportRead(#[source] io::Error),

    #[error("transport write failed: {0}")]
    TransportWrite(#[source] io::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    Missing(&'static str),

    #[error("invalid value '{value}' for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}
