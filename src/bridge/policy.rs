use std::io;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadDecision {
    Abort,
    Retry(Duration),
}

/// The one place that decides what a failed transport read means.
pub trait ReadErrorPolicy: Send {
    fn on_read_error(&mut self, err: &io::Error) -> ReadDecision;

    /// Called after every successful read.
    fn on_read_ok(&mut self) {}
}

/// Any read failure ends the loop.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailFast;

impl ReadErrorPolicy for FailFast {
    fn on_read_error(&mut self, _err: &io::Error) -> ReadDecision {
        ReadDecision::Abort
    }
}

/// Retries up to `max_attempts` consecutive failures with a fixed delay.
#[derive(Debug, Clone)]
pub struct BoundedRetry {
    max_attempts: u32,
    backoff: Duration,
    failures: u32,
}

impl BoundedRetry {
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts,
            backoff,
            failures: 0,
        }
    }
}

impl ReadErrorPolicy for BoundedRetry {
    fn on_read_error(&mut self, _err: &io::Error) -> ReadDecision {
        if self.failures >= self.max_attempts {
            return ReadDecision::Abort;
        }
        self.failures += 1;
        ReadDecision::Retry(self.backoff)
    }

    fn on_read_ok(&mut self) {
        self.failures = 0;
    }
}

impl<P: ReadErrorPolicy + ?Sized> ReadErrorPolicy for Box<P> {
    fn on_read_error(&mut self, err: &io::Error) -> ReadDecision {
        (**self).on_read_error(err)
    }

    fn on_read_ok(&mut self) {
        (**self).on_read_ok()
    }
}
