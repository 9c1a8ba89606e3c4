use std::io::{self, Read};
use std::sync::Arc;
use std::thread;
use tracing::{error, info, warn};

use super::classifier::classify;
use super::event::EventKind;
use super::framer::{FramerOverflow, StreamFramer};
use super::policy::{FailFast, ReadDecision, ReadErrorPolicy};
use crate::error::{BridgeError, PayloadParseError};
use crate::telemetry::metrics::{action_for, MetricAction};
use crate::telemetry::registry::MetricsRegistry;

/// Transport read unit.
pub const READ_CHUNK: usize = 128;

/// What happened to one record (or to the pending buffer).
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Applied {
        event: EventKind,
        action: MetricAction,
    },
    /// Classified as `Unrecognized`; no registry mutation.
    NoOp { record: String },
    PayloadRejected {
        record: String,
        fault: PayloadParseError,
    },
    /// The registry refused the mapped action; the record is dropped.
    Rejected {
        event: EventKind,
        action: MetricAction,
        reason: String,
    },
    Overflow(FramerOverflow),
}

/// Drives framer -> classifier -> registry for one transport stream.
pub struct Bridge<R> {
    transport: R,
    framer: StreamFramer,
    registry: Arc<MetricsRegistry>,
    policy: Box<dyn ReadErrorPolicy>,
}

impl<R: Read> Bridge<R> {
    pub fn new(transport: R, framer: StreamFramer, registry: Arc<MetricsRegistry>) -> Self {
        Self {
            transport,
            framer,
            registry,
            policy: Box::new(FailFast),
        }
    }

    pub fn with_policy(mut self, policy: impl ReadErrorPolicy + 'static) -> Self {
        self.policy = Box::new(policy);
        self
    }

    pub fn framer(&self) -> &StreamFramer {
        &self.framer
    }

    /// Synchronous step: frames one chunk and applies every record to the
    /// shared registry. Failures stay inside the returned outcomes.
    pub fn step(&mut self, chunk: &[u8]) -> Vec<Outcome> {
        let framed = self.framer.feed(chunk);
        let mut outcomes = Vec::with_capacity(framed.records.len() + 1);

        if let Some(overflow) = framed.overflow {
            let outcome = Outcome::Overflow(overflow);
            report(&outcome);
            outcomes.push(outcome);
        }

        for record in framed.records {
            let classification = classify(&record);
            let outcome = match (classification.fault, action_for(&classification.kind)) {
                (Some(fault), _) => Outcome::PayloadRejected {
                    record: record.into_string(),
                    fault,
                },
                (None, Some(action)) => match self.registry.apply(action) {
                    Ok(()) => Outcome::Applied {
                        event: classification.kind,
                        action,
                    },
                    Err(e) => Outcome::Rejected {
                        event: classification.kind,
                        action,
                        reason: e.to_string(),
                    },
                },
                (None, None) => Outcome::NoOp {
                    record: record.into_string(),
                },
            };
            report(&outcome);
            outcomes.push(outcome);
        }

        outcomes
    }

    /// Blocking driver loop. Only returns when the read policy gives up.
    pub fn run(mut self) -> BridgeError {
        let mut buf = [0u8; READ_CHUNK];
        info!(framing = ?self.framer.framing(), "Start read loop for transport");

        loop {
            let read = match self.transport.read(&mut buf) {
                Ok(0) => Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "transport closed",
                )),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                other => other,
            };

            match read {
                Ok(n) => {
                    self.policy.on_read_ok();
                    self.step(&buf[..n]);
                }
                Err(err) => match self.policy.on_read_error(&err) {
                    ReadDecision::Abort => {
                        error!(error = %err, "Error trying to read transport");
                        return BridgeError::TransportRead(err);
                    }
                    ReadDecision::Retry(delay) => {
                        warn!(error = %err, ?delay, "Transport read failed, retrying");
                        thread::sleep(delay);
                    }
                },
            }
        }
    }
}

fn report(outcome: &Outcome) {
    match outcome {
        Outcome::Applied { event, action } => match action {
            MetricAction::Increment(name) => info!(?event, metric = name, "increment"),
            MetricAction::Set(name, value) => info!(?event, metric = name, value, "set"),
        },
        Outcome::Rejected {
            event,
            action,
            reason,
        } => error!(?event, ?action, error = %reason, "Registry rejected a mapped event"),
        Outcome::NoOp { record } => info!(record = %record, "No-op"),
        Outcome::PayloadRejected { record, fault } => {
            warn!(record = %record, error = %fault, "Could not parse payload, record ignored")
        }
        Outcome::Overflow(overflow) => warn!(
            limit = overflow.limit,
            discarded = overflow.discarded,
            "Pending buffer exceeded limit without a delimiter, discarded"
        ),
    }
}
